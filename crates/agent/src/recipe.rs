//! Recipe parsing and composition.
//!
//! The extractor answers in a sectioned plain-text layout
//! (`Title:` / `Ingredients:` / `Instructions:`). This module turns that
//! text into a [`Recipe`] and renders the final reply in the same layout.

use regex_lite::Regex;
use std::sync::LazyLock;

static SECTION_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[#*\s]*(title|ingredients|instructions|steps|directions|method)[*\s]*:[*\s]*(.*)$")
        .expect("static regex")
});

// A number only counts as a marker when whitespace follows, so "0.5 cup"
// keeps its amount.
static LIST_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:[-*•]\s*|\d+[.)]\s+)").expect("static regex"));

/// A structured recipe.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Recipe {
    pub title: Option<String>,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
}

#[derive(Clone, Copy)]
enum Section {
    Preamble,
    Ingredients,
    Instructions,
}

impl Recipe {
    /// Parse sectioned text. Unknown lines before the first section are ignored.
    ///
    /// A section that contains list items keeps only those; bare lines in it
    /// are commentary.
    pub fn parse(text: &str) -> Self {
        let mut title = None;
        let mut ingredients = Vec::new();
        let mut instructions = Vec::new();
        let mut section = Section::Preamble;

        for line in text.lines() {
            if let Some(caps) = SECTION_HEADER.captures(line) {
                let header = caps[1].to_ascii_lowercase();
                let rest = caps[2].trim().trim_end_matches('*').trim();
                match header.as_str() {
                    "title" => {
                        if !rest.is_empty() {
                            title = Some(rest.to_string());
                        }
                        continue;
                    }
                    "ingredients" => section = Section::Ingredients,
                    _ => section = Section::Instructions,
                }
                if let Some(entry) = list_entry(rest) {
                    push(section, entry, &mut ingredients, &mut instructions);
                }
                continue;
            }

            if let Some(entry) = list_entry(line) {
                push(section, entry, &mut ingredients, &mut instructions);
            }
        }

        Recipe {
            title,
            ingredients: keep_items(ingredients),
            instructions: keep_items(instructions),
        }
    }

    /// The same recipe with its ingredient list replaced.
    pub fn with_ingredients(&self, ingredients: Vec<String>) -> Self {
        Self {
            ingredients,
            ..self.clone()
        }
    }

    /// Render in the fixed Title / Ingredients / Instructions layout.
    pub fn render(&self) -> String {
        let mut out = format!(
            "Title: {}\n\nIngredients:\n",
            self.title.as_deref().unwrap_or("Untitled recipe")
        );
        for ingredient in &self.ingredients {
            out.push_str(&format!("- {ingredient}\n"));
        }
        out.push_str("\nInstructions:\n");
        for (i, step) in self.instructions.iter().enumerate() {
            out.push_str(&format!("{}. {step}\n", i + 1));
        }
        out.trim_end().to_string()
    }
}

/// One candidate line with whether it carried a list marker.
struct Entry {
    marked: bool,
    text: String,
}

fn list_entry(line: &str) -> Option<Entry> {
    let marked = LIST_MARKER.is_match(line);
    let text = LIST_MARKER.replace(line, "");
    let text = text.trim();
    (!text.is_empty()).then(|| Entry {
        marked,
        text: text.to_string(),
    })
}

fn push(section: Section, entry: Entry, ingredients: &mut Vec<Entry>, instructions: &mut Vec<Entry>) {
    match section {
        Section::Preamble => {}
        Section::Ingredients => ingredients.push(entry),
        Section::Instructions => instructions.push(entry),
    }
}

/// Marked entries if there are any, otherwise every entry.
fn keep_items(entries: Vec<Entry>) -> Vec<String> {
    let any_marked = entries.iter().any(|e| e.marked);
    entries
        .into_iter()
        .filter(|e| e.marked || !any_marked)
        .map(|e| e.text)
        .collect()
}

/// Parse a plain list reply.
///
/// When any line is bulleted or numbered only those lines are items;
/// otherwise every bare line is. Section headers such as `Ingredients:` and
/// lead-in lines ending in a colon are skipped.
pub fn parse_list(text: &str) -> Vec<String> {
    keep_items(
        text.lines()
            .filter(|line| !SECTION_HEADER.is_match(line) && !line.trim_end().ends_with(':'))
            .filter_map(list_entry)
            .collect(),
    )
}

/// Render items as a `- ` bullet list.
pub fn render_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("- {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Drop every line that mentions one of `agent_names` (case-insensitive).
pub fn strip_meta(text: &str, agent_names: &[&str]) -> String {
    let names: Vec<String> = agent_names.iter().map(|n| n.to_lowercase()).collect();
    text.lines()
        .filter(|line| {
            let lower = line.to_lowercase();
            !names.iter().any(|name| lower.contains(name.as_str()))
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
