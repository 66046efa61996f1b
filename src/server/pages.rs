//! HTML pages. Every piece of user-supplied text goes through [`escape`].

use crate::db::models::{LogColumns, LogRecord};
use std::fmt::Write as _;

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!doctype html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n</head>\n<body>\n<h2>{title}</h2>\n{body}\n</body>\n</html>\n",
        title = escape(title),
    )
}

pub fn entry() -> String {
    layout(
        "Welcome to search 4 letters on the web!",
        r#"<form method="POST" action="/search4">
<table>
<tr><td>Phrase:</td><td><input name="phrase" type="text" width="60"></td></tr>
<tr><td>Letters:</td><td><input name="letters" type="text" value="aeiou"></td></tr>
</table>
<p>When you're ready, click this button:</p>
<p><input value="Do it!" type="submit"></p>
</form>"#,
    )
}

pub fn results(phrase: &str, letters: &str, found: &str) -> String {
    let body = format!(
        "<p>You submitted the following data:</p>\n<table>\n<tr><td>Phrase:</td><td>{}</td></tr>\n<tr><td>Letters:</td><td>{}</td></tr>\n</table>\n<p>When \"{}\" is searched for \"{}\", the following results are returned:</p>\n<h3>{}</h3>",
        escape(phrase),
        escape(letters),
        escape(phrase),
        escape(letters),
        escape(found),
    );
    layout("Your search results!", &body)
}

pub fn view_log(columns: LogColumns, records: &[LogRecord]) -> String {
    let mut body = String::from("<table>\n<tr>");
    for title in columns.titles() {
        let _ = write!(body, "<th>{}</th>", escape(title));
    }
    body.push_str("</tr>\n");

    for rec in records {
        body.push_str("<tr>");
        let mut cell = |value: &str| {
            let _ = write!(body, "<td>{}</td>", escape(value));
        };
        cell(&rec.phrase);
        cell(&rec.letters);
        if columns.includes_client_addr() {
            cell(rec.client_addr.as_deref().unwrap_or(""));
        }
        cell(&rec.user_agent);
        cell(&rec.results);
        body.push_str("</tr>\n");
    }
    body.push_str("</table>");
    layout("View Log", &body)
}

pub fn access_denied() -> String {
    layout(
        "Access denied",
        "<p>You need to <a href=\"/login\">log in</a> to see this page.</p>",
    )
}
