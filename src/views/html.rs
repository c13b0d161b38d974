/// Convert a post's HTML body into plain text for the terminal.
///
/// Paragraphs and `<br>` become line breaks, every other tag is dropped
/// (links keep their text), `invisible` spans that Mastodon uses to shorten
/// URLs are removed, and entities are decoded. Blank lines are dropped and
/// runs of whitespace collapse to one space.
pub fn strip_html(html: &str) -> String {
    let html = drop_invisible_spans(html)
        .replace("</p>", "\n")
        .replace("<br>", "\n")
        .replace("<br/>", "\n")
        .replace("<br />", "\n");

    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }

    html_escape::decode_html_entities(&text)
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn drop_invisible_spans(html: &str) -> String {
    const OPEN: &str = "<span class=\"invisible\">";
    const CLOSE: &str = "</span>";

    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(start) = rest.find(OPEN) {
        out.push_str(&rest[..start]);
        let after = &rest[start + OPEN.len()..];
        match after.find(CLOSE) {
            Some(end) => rest = &after[end + CLOSE.len()..],
            None => {
                rest = "";
                break;
            }
        }
    }
    out.push_str(rest);
    out
}
