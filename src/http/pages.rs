//! Minimal server-rendered pages.

use crate::roster::{iso_millis, Registrant, Settings, MAX_GAME};

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{}</title>\n</head>\n<body>\n{body}\n</body>\n</html>\n",
        escape(title)
    )
}

fn notice(class: &str, message: Option<&str>) -> String {
    message
        .map(|m| format!("<p class=\"{class}\">{}</p>", escape(m)))
        .unwrap_or_default()
}

fn game_label(game: u8) -> String {
    if game == 0 {
        "none".to_string()
    } else {
        format!("Game {game}")
    }
}

pub fn landing(settings: &Settings, success: Option<&str>, error: Option<&str>) -> String {
    let form = if settings.registrations_closed {
        "<p class=\"closed\">Registrations are closed.</p>".to_string()
    } else if !settings.has_active_game() {
        "<p class=\"closed\">No game is open for registration.</p>".to_string()
    } else {
        format!(
            "<h2>Register for {}</h2>\n\
             <form method=\"post\" action=\"register\">\n\
             <label>Name <input name=\"name\" required></label>\n\
             <label>Phone <input name=\"phone\" type=\"tel\" required></label>\n\
             <button type=\"submit\">Register</button>\n</form>",
            game_label(settings.active_game)
        )
    };

    layout(
        "Game Registration",
        &format!(
            "<h1>Game Registration</h1>\n{}{}\n{form}",
            notice("success", success),
            notice("error", error)
        ),
    )
}

pub fn confirmation(registrant: &Registrant) -> String {
    let game = registrant.game.map(game_label).unwrap_or_default();
    let turn = registrant
        .turn_number
        .map(|t| t.to_string())
        .unwrap_or_default();
    layout(
        "You're registered",
        &format!(
            "<h1>You're registered, {}!</h1>\n<p>{}</p>\n<p class=\"turn\">Your turn number: <strong>{turn}</strong></p>\n\
             <p><a href=\"/\">Back</a></p>",
            escape(&registrant.name),
            escape(&game)
        ),
    )
}

pub fn admin_login(error: Option<&str>) -> String {
    layout(
        "Admin Login",
        &format!(
            "<h1>Admin Login</h1>\n{}\n\
             <form method=\"post\" action=\"/admin/login\">\n\
             <label>PIN <input name=\"pin\" type=\"password\" required></label>\n\
             <button type=\"submit\">Log in</button>\n</form>",
            notice("error", error)
        ),
    )
}

pub fn admin_dashboard(settings: &Settings, registrants: &[Registrant]) -> String {
    let options: String = (1..=MAX_GAME)
        .map(|g| {
            let selected = if g == settings.active_game { " selected" } else { "" };
            format!("<option value=\"{g}\"{selected}>Game {g}</option>")
        })
        .collect();

    let rows: String = registrants
        .iter()
        .map(|r| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                escape(&r.name),
                escape(&r.phone),
                r.game.map(|g| g.to_string()).unwrap_or_default(),
                r.turn_number.map(|t| t.to_string()).unwrap_or_default(),
                iso_millis::format(&r.created_at)
            )
        })
        .collect();

    let toggle_label = if settings.registrations_closed {
        "Open registrations"
    } else {
        "Close registrations"
    };

    layout(
        "Admin",
        &format!(
            "<h1>Admin</h1>\n\
             <p>Registrations: <strong>{}</strong> &middot; Active: <strong>{}</strong> &middot; {} registrants</p>\n\
             <form method=\"post\" action=\"/admin/toggle\"><button type=\"submit\">{toggle_label}</button></form>\n\
             <form method=\"post\" action=\"/admin/set-game\"><select name=\"game\">{options}</select>\
             <button type=\"submit\">Set game</button></form>\n\
             <p><a href=\"/admin/export\">Export CSV</a></p>\n\
             <form method=\"post\" action=\"/admin/logout\"><button type=\"submit\">Log out</button></form>\n\
             <table>\n<tr><th>Name</th><th>Phone</th><th>Game</th><th>Turn</th><th>Registered</th></tr>\n{rows}</table>",
            if settings.registrations_closed { "closed" } else { "open" },
            game_label(settings.active_game),
            registrants.len()
        ),
    )
}

pub fn not_found() -> String {
    layout("Not found", "<h1>Not found</h1>\n<p><a href=\"/\">Back</a></p>")
}

pub fn server_error() -> String {
    layout(
        "Something went wrong",
        "<h1>Something went wrong</h1>\n<p>Please try again in a moment.</p>",
    )
}
