//! Renders analysis results as a text table or a JSON document. Only
//! desired slots appear; the problem count is reported per signal.

use chrono::Utc;
use serde_json::{json, Value};
use waveform_stats::StatSlot;

pub(crate) struct SignalReport {
    pub(crate) name: String,
    pub(crate) problems: usize,
    pub(crate) slots: Vec<StatSlot>,
}

impl SignalReport {
    fn desired(&self) -> impl Iterator<Item = &StatSlot> {
        self.slots.iter().filter(|slot| slot.desired)
    }
}

pub(crate) fn render_text(reports: &[SignalReport]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "# waveform statistics, generated {}\n",
        Utc::now().to_rfc3339()
    ));
    for report in reports {
        out.push_str(&format!(
            "\n{} ({} problems)\n",
            report.name, report.problems
        ));
        for slot in report.desired() {
            out.push_str(&format!(
                "  {:<28} {:>18.9e} {:<8} {}\n",
                slot.name,
                slot.result,
                slot.units.as_deref().unwrap_or(""),
                slot.description,
            ));
        }
    }
    out
}

pub(crate) fn render_json(reports: &[SignalReport]) -> Value {
    json!({
        "generated": Utc::now().to_rfc3339(),
        "signals": reports
            .iter()
            .map(|report| {
                json!({
                    "name": &report.name,
                    "problems": report.problems,
                    "statistics": report
                        .desired()
                        .map(|slot| {
                            json!({
                                "name": &slot.name,
                                "value": slot.result,
                                "units": &slot.units,
                                "description": &slot.description,
                            })
                        })
                        .collect::<Vec<_>>(),
                })
            })
            .collect::<Vec<_>>(),
    })
}
