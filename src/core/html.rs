// src/core/html.rs
// Low-level HTML string slicing, tailored to the portal's page structure.
// Deliberately naive: no DOM, no nesting awareness, case-insensitive on
// ASCII tag and attribute names. The pages are machine-generated and flat
// enough that this holds up.

use url::Url;

use crate::core::sanitize::normalize_entities;
use crate::error::{Error, Result};

/// ASCII-only lowercasing; byte offsets stay valid against the original.
pub fn to_lower(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii() { c.to_ascii_lowercase() } else { c })
        .collect()
}

/// Find the next complete tag block from `from` onwards, case-insensitive.
/// A block spans from the start of the opening tag to the end of the
/// closing tag, e.g. `<td ...> ... </td>`.
pub fn next_tag_block_ci(
    s: &str,
    open_tag: &str,
    close_tag: &str,
    from: usize,
) -> Option<(usize, usize)> {
    let lc = to_lower(s);
    let open_lc = to_lower(open_tag);
    let close_lc = to_lower(close_tag);

    let mut search = from;
    loop {
        let start = lc.get(search..)?.find(&open_lc)? + search;
        let after = start + open_lc.len();
        // "<td" must not match "<tdata"
        let boundary_ok = match lc.as_bytes().get(after) {
            Some(b) => !b.is_ascii_alphanumeric(),
            None => false,
        };
        if !boundary_ok {
            search = after;
            continue;
        }
        let open_end = s[start..].find('>')? + start + 1;
        let end_rel = lc[open_end..].find(&close_lc)?;
        let end = open_end + end_rel + close_tag.len();
        return Some((start, end));
    }
}

/// The opening tag's text, without the angle brackets:
/// `<td class="x">...` yields `td class="x"`.
pub fn opener(block: &str) -> &str {
    match (block.strip_prefix('<'), block.find('>')) {
        (Some(_), Some(gt)) => &block[1..gt],
        _ => "",
    }
}

/// Given a complete block like `<td ...>INNER</td>`, return INNER
/// (which may still contain nested tags).
pub fn inner_after_open_tag(block: &str) -> &str {
    if let (Some(open_end), Some(close_start)) = (block.find('>'), block.rfind('<')) {
        if close_start > open_end {
            return &block[open_end + 1..close_start];
        }
    }
    ""
}

/// Extract an attribute value from an opener text, handling single, double
/// and missing quotes. Entities in the value are decoded.
pub fn attr(opener_text: &str, name: &str) -> Option<String> {
    let lc = to_lower(opener_text);
    let name_lc = to_lower(name);
    let bytes = lc.as_bytes();

    let mut search = 0;
    while let Some(rel) = lc.get(search..)?.find(&name_lc) {
        let at = search + rel;
        search = at + name_lc.len();

        let before_ok = at == 0 || {
            let b = bytes[at - 1];
            !(b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        };
        if !before_ok {
            continue;
        }

        let mut j = at + name_lc.len();
        while bytes.get(j).is_some_and(|b| b.is_ascii_whitespace()) {
            j += 1;
        }
        if bytes.get(j) != Some(&b'=') {
            continue;
        }
        j += 1;
        while bytes.get(j).is_some_and(|b| b.is_ascii_whitespace()) {
            j += 1;
        }

        let val = &opener_text[j..];
        let (quote, start_off) = match val.as_bytes().first() {
            Some(b'"') => ('"', 1),
            Some(b'\'') => ('\'', 1),
            _ => ('\0', 0),
        };
        let end = if quote != '\0' {
            val[start_off..].find(quote).map(|e| start_off + e)
        } else {
            val.find(|c: char| c.is_ascii_whitespace())
        }
        .unwrap_or(val.len());

        return Some(normalize_entities(&val[start_off..end]));
    }
    None
}

/// Is a bare or valued attribute present? (`checked`, `selected`, ...)
pub fn has_attr(opener_text: &str, name: &str) -> bool {
    let lc = to_lower(opener_text);
    let name_lc = to_lower(name);
    let bytes = lc.as_bytes();

    let mut search = 0;
    while let Some(rel) = lc[search..].find(&name_lc) {
        let at = search + rel;
        search = at + name_lc.len();

        let before_ok = at == 0 || {
            let b = bytes[at - 1];
            !(b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        };
        let after = bytes.get(at + name_lc.len());
        let after_ok = match after {
            None => true,
            Some(b) => b.is_ascii_whitespace() || *b == b'=' || *b == b'/' || *b == b'>',
        };
        if before_ok && after_ok {
            return true;
        }
    }
    false
}

/// Does the opener's `class` attribute carry `class` as a whole token?
/// Tolerant of multiple classes in any order.
pub fn has_class(opener_text: &str, class: &str) -> bool {
    attr(opener_text, "class")
        .map(|v| v.split_ascii_whitespace().any(|t| t.eq_ignore_ascii_case(class)))
        .unwrap_or(false)
}

/// All `<tag ...>...</tag>` blocks whose class attribute contains `class`.
pub fn blocks_with_class<'a>(s: &'a str, tag: &str, class: &str) -> Vec<&'a str> {
    let open = format!("<{tag}");
    let close = format!("</{tag}>");
    let mut out = Vec::new();
    let mut pos = 0usize;
    while let Some((b0, b1)) = next_tag_block_ci(s, &open, &close, pos) {
        let block = &s[b0..b1];
        if has_class(opener(block), class) {
            out.push(block);
        }
        pos = b1;
    }
    out
}

/// Inner HTML of every `<td>` cell in a table block, in document order.
pub fn td_cells(table_block: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut pos = 0usize;
    while let Some((c0, c1)) = next_tag_block_ci(table_block, "<td", "</td>", pos) {
        out.push(inner_after_open_tag(&table_block[c0..c1]));
        pos = c1;
    }
    out
}

/// href of the first anchor inside `cell`, if any.
pub fn first_href(cell: &str) -> Option<String> {
    let (a0, a1) = next_tag_block_ci(cell, "<a", "</a>", 0)?;
    attr(opener(&cell[a0..a1]), "href")
}

/// A parsed form: where it submits to, how, and its pre-filled fields
/// (inputs first, then textareas and selects).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Form {
    pub action: Option<String>,
    pub method: Option<String>,
    pub fields: Vec<(String, String)>,
}

impl Form {
    pub fn is_post(&self) -> bool {
        self.method
            .as_deref()
            .map(|m| m.eq_ignore_ascii_case("post"))
            .unwrap_or(false)
    }

    /// Absolute submission URL: the action resolved against the page URL,
    /// or the page URL itself when the action is missing or empty.
    pub fn action_url(&self, page_url: &str) -> Result<String> {
        match self.action.as_deref().filter(|a| !a.is_empty()) {
            None => Ok(page_url.to_string()),
            Some(action) => {
                let base = Url::parse(page_url)
                    .map_err(|e| Error::scrape("form action", format!("bad page URL {page_url}: {e}")))?;
                let resolved = base
                    .join(action)
                    .map_err(|e| Error::scrape("form action", format!("bad action '{action}': {e}")))?;
                Ok(resolved.to_string())
            }
        }
    }

    /// Replace a field's value, adding the field if the form lacks it.
    pub fn set_field(&mut self, name: &str, value: &str) {
        match self.fields.iter_mut().find(|(n, _)| n == name) {
            Some(field) => field.1 = value.to_string(),
            None => self.fields.push((name.to_string(), value.to_string())),
        }
    }
}

/// Parse the first `<form>` on the page: action, method and every named
/// control with its current value (inputs, textareas, selects). Unchecked
/// checkboxes and radios are omitted, matching what a browser would submit.
pub fn first_form(doc: &str) -> Option<Form> {
    let (f0, f1) = next_tag_block_ci(doc, "<form", "</form>", 0)?;
    let block = &doc[f0..f1];
    let op = opener(block);

    let mut form = Form {
        action: attr(op, "action"),
        method: attr(op, "method"),
        fields: Vec::new(),
    };
    collect_inputs(block, &mut form.fields);
    collect_textareas(block, &mut form.fields);
    collect_selects(block, &mut form.fields);
    Some(form)
}

fn collect_inputs(block: &str, fields: &mut Vec<(String, String)>) {
    let lc = to_lower(block);
    let mut pos = 0usize;
    while let Some(rel) = lc[pos..].find("<input") {
        let at = pos + rel;
        let after = lc.as_bytes().get(at + "<input".len());
        let boundary_ok = matches!(after, Some(b) if b.is_ascii_whitespace() || *b == b'/' || *b == b'>');
        let Some(gt) = block[at..].find('>').map(|e| at + e) else {
            return;
        };
        pos = gt + 1;
        if !boundary_ok {
            continue;
        }

        let op = block[at + 1..gt].trim_end_matches('/');
        let Some(name) = attr(op, "name") else { continue };
        let ty = attr(op, "type").unwrap_or_default().to_ascii_lowercase();
        let toggled = ty == "checkbox" || ty == "radio";
        if toggled && !has_attr(op, "checked") {
            continue;
        }
        let value = attr(op, "value")
            .unwrap_or_else(|| if toggled { "on".to_string() } else { String::new() });
        fields.push((name, value));
    }
}

fn collect_textareas(block: &str, fields: &mut Vec<(String, String)>) {
    let mut pos = 0usize;
    while let Some((t0, t1)) = next_tag_block_ci(block, "<textarea", "</textarea>", pos) {
        let area = &block[t0..t1];
        if let Some(name) = attr(opener(area), "name") {
            fields.push((name, normalize_entities(inner_after_open_tag(area))));
        }
        pos = t1;
    }
}

fn collect_selects(block: &str, fields: &mut Vec<(String, String)>) {
    let mut pos = 0usize;
    while let Some((s0, s1)) = next_tag_block_ci(block, "<select", "</select>", pos) {
        let select = &block[s0..s1];
        pos = s1;
        let Some(name) = attr(opener(select), "name") else { continue };

        let mut chosen: Option<String> = None;
        let mut first: Option<String> = None;
        let mut opos = 0usize;
        while let Some((o0, o1)) = next_tag_block_ci(select, "<option", "</option>", opos) {
            let option = &select[o0..o1];
            opos = o1;
            let value = attr(opener(option), "value").unwrap_or_else(|| {
                crate::core::sanitize::strip_tags(inner_after_open_tag(option))
            });
            if first.is_none() {
                first = Some(value.clone());
            }
            if has_attr(opener(option), "selected") {
                chosen = Some(value);
                break;
            }
        }
        if let Some(value) = chosen.or(first) {
            fields.push((name, value));
        }
    }
}

/// Append form fields to a URL as query parameters (GET submission).
pub fn append_query(url: &str, fields: &[(String, String)]) -> Result<String> {
    let mut parsed = Url::parse(url)
        .map_err(|e| Error::scrape("form submission", format!("bad URL {url}: {e}")))?;
    parsed.query_pairs_mut().extend_pairs(fields.iter().map(|(n, v)| (n.as_str(), v.as_str())));
    Ok(parsed.to_string())
}
