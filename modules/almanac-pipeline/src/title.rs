use almanac_common::text::{norm, strip_parens};
use almanac_common::Category;

/// Rewrite a record's display title into a semantic one from category
/// and text cues. Purely a display transform; matching and scoring
/// keep using the original feed text.
pub fn semantic_title(category: Category, raw_title: &str, raw_text: &str) -> String {
    let collapsed = raw_title.split_whitespace().collect::<Vec<_>>().join(" ");
    let stripped = strip_parens(&collapsed);
    let base = if stripped.is_empty() { collapsed } else { stripped };

    match category {
        Category::Birth => return format!("Birthday of {base}"),
        Category::Death => return format!("Death of {base}"),
        Category::Event => {}
    }

    let text = norm(raw_text);
    let base_norm = norm(&base);
    let contains_any =
        |haystack: &str, needles: &[&str]| needles.iter().any(|n| haystack.contains(n));

    if contains_any(&base_norm, &["treaty", "accord", "agreement"])
        || contains_any(&text, &["treaty", "accord", "agreement", "signed"])
    {
        return if text.contains("signed") {
            format!("{base} signed")
        } else {
            base
        };
    }
    if text.contains("independence") || text.contains("proclaimed") || base_norm.contains("independence")
    {
        let title = format!("Independence of {base}");
        return title.replacen("Independence of Independence of", "Independence of", 1);
    }
    if text.contains("assassin") {
        return format!("Assassination of {base}");
    }
    if contains_any(&text, &["launch", "inaugurat"]) {
        return format!("Launch of {base}");
    }
    if contains_any(&text, &["founded", "establish", "formed", "create"]) {
        return format!("Founding of {base}");
    }
    if contains_any(&text, &["begins", "began", "start", "commence"]) {
        return format!("Start of {base}");
    }
    if contains_any(&text, &["wins", "won", "victory", "defeat"]) {
        return format!("Victory: {base}");
    }
    if contains_any(&text, &["elected", "sworn in"]) {
        return format!("Swearing-in/Election of {base}");
    }
    if contains_any(
        &text,
        &["earthquake", "cyclone", "flood", "tsunami", "explosion", "bomb"],
    ) {
        return format!("Major event: {base}");
    }

    format!("Event: {base}")
}
