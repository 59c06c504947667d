//! Sheet resolution: patterns to concrete sheets

use std::cmp::Ordering;
use std::collections::HashSet;

use excavator_core::{Workbook, Worksheet};

use crate::error::SheetError;
use crate::rules::{Pattern, SheetGroup, Wildcard};

/// One step of a group's resolution, in processing order
#[derive(Debug)]
pub(crate) enum Resolved<'a> {
    Sheet(&'a Worksheet),
    Failed { key: String, error: SheetError },
}

/// Resolve a group's patterns against a workbook
///
/// Literal patterns must name an existing sheet. A wildcard expands to every
/// matching sheet in natural order of the part matched by `*`; `skip_sheets`
/// removes sheets from the expansion, and `break_if_null` ends it at the
/// first sheet whose designated cell is empty. A sheet reached by several
/// patterns is kept at its first position only.
pub(crate) fn resolve_group<'a>(group: &SheetGroup, workbook: &'a Workbook) -> Vec<Resolved<'a>> {
    let mut resolved = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for pattern in group.patterns() {
        match pattern {
            Pattern::Literal(name) => match workbook.worksheet_by_name(name) {
                Some(_) if group.is_skipped(name) => {
                    log::debug!("sheet '{}' skipped", name);
                }
                Some(sheet) => {
                    if seen.insert(sheet.name()) {
                        resolved.push(Resolved::Sheet(sheet));
                    }
                }
                None => resolved.push(Resolved::Failed {
                    key: name.clone(),
                    error: SheetError::NotFound(name.clone()),
                }),
            },
            Pattern::Wildcard(wildcard) => {
                let matches = expand(wildcard, workbook);
                if matches.is_empty() {
                    let key = pattern.to_string();
                    resolved.push(Resolved::Failed {
                        error: SheetError::NoMatch(key.clone()),
                        key,
                    });
                    continue;
                }

                for sheet in matches {
                    if group.is_skipped(sheet.name()) {
                        log::debug!("sheet '{}' skipped", sheet.name());
                        continue;
                    }
                    if let Some(addr) = group.break_if_null() {
                        if sheet.value(addr).is_blank() {
                            log::debug!(
                                "'{}' stops at sheet '{}': {} is empty",
                                pattern,
                                sheet.name(),
                                addr
                            );
                            break;
                        }
                    }
                    if seen.insert(sheet.name()) {
                        resolved.push(Resolved::Sheet(sheet));
                    }
                }
            }
        }
    }

    resolved
}

/// Sheets matching a wildcard, sorted by their captured part
fn expand<'a>(wildcard: &Wildcard, workbook: &'a Workbook) -> Vec<&'a Worksheet> {
    let mut matches: Vec<(&str, &Worksheet)> = workbook
        .worksheets()
        .filter_map(|sheet| wildcard.capture(sheet.name()).map(|c| (c, sheet)))
        .collect();

    matches.sort_by(|(a, sheet_a), (b, sheet_b)| {
        natural_cmp(a, b).then_with(|| sheet_a.name().cmp(sheet_b.name()))
    });
    matches.into_iter().map(|(_, sheet)| sheet).collect()
}

/// Numeric captures first, ascending by value; then the rest lexicographically
pub(crate) fn natural_cmp(a: &str, b: &str) -> Ordering {
    fn numeric(s: &str) -> Option<&str> {
        (!s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())).then(|| s.trim_start_matches('0'))
    }

    match (numeric(a), numeric(b)) {
        // Compare digit strings without parsing so long runs cannot overflow
        (Some(x), Some(y)) => x.len().cmp(&y.len()).then_with(|| x.cmp(y)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}
