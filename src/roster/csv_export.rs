use super::{iso_millis, Registrant};

/// Column names of the registrant export
pub const CSV_HEADER: [&str; 5] = ["name", "phone", "game", "turnNumber", "createdAt"];

/// Render registrants as CSV, in the order given.
///
/// Every field is double-quoted with embedded quotes doubled. Rows are
/// separated by `\n` with no trailing newline. Fields missing from legacy
/// records render as empty strings.
pub fn render_csv(registrants: &[Registrant]) -> String {
    let header = CSV_HEADER.iter().map(|h| h.to_string()).collect::<Vec<_>>();
    let rows = registrants.iter().map(|r| {
        vec![
            r.name.clone(),
            r.phone.clone(),
            r.game.map(|g| g.to_string()).unwrap_or_default(),
            r.turn_number.map(|t| t.to_string()).unwrap_or_default(),
            iso_millis::format(&r.created_at),
        ]
    });

    std::iter::once(header)
        .chain(rows)
        .map(|fields| fields.iter().map(|f| quote(f)).collect::<Vec<_>>().join(","))
        .collect::<Vec<_>>()
        .join("\n")
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}
