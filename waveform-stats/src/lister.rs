//! Presentation helper: lists the catalog, one line per statistic.

use crate::catalog::Catalog;
use std::io::{self, Write};

/// Stands in for the signal name in listings, where no real signal applies.
pub const PLACEHOLDER_SUBJECT: &str = "<signal>";

/// Writes one line per catalog entry: the statistic name and its
/// description with a placeholder subject.
pub fn list_statistics(catalog: &Catalog, out: &mut impl Write) -> io::Result<()> {
    for def in catalog.iter() {
        writeln!(out, "{:<14} {}", def.name, def.describe(PLACEHOLDER_SUBJECT))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CATALOG;

    #[test]
    fn one_line_per_statistic() {
        let mut listing = Vec::new();
        list_statistics(&CATALOG, &mut listing).unwrap();
        let listing = String::from_utf8(listing).unwrap();
        assert_eq!(listing.lines().count(), CATALOG.len());
        assert!(listing.contains("Baseline"));
        assert!(listing.contains("average period of <signal>"));
    }
}
