//! The `phonoquiz show` command.

use std::path::PathBuf;

use anyhow::Result;

use phonoquiz_core::model::{Exercise, Options};

use crate::config::load_config_from;

pub fn execute(exercise: String, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let exercise = super::resolve_exercise(&exercise, &config)?;
    print!("{}", render_page(&exercise));
    Ok(())
}

fn render_page(exercise: &Exercise) -> String {
    let mut out = format!("{}\n", exercise.title);
    if !exercise.heading.is_empty() {
        out.push_str(&format!("{}\n", exercise.heading));
    }
    if !exercise.instructions.is_empty() {
        out.push_str(&format!("\n{}\n", exercise.instructions.trim_end()));
    }

    if exercise.shape.is_row() {
        out.push_str("\nColumns:\n");
        for column in &exercise.columns {
            let optional = if column.required { "" } else { " (optional)" };
            if column.options.is_empty() {
                out.push_str(&format!("  {}{}\n", column.name, optional));
            } else {
                out.push_str(&format!(
                    "  {}{}: {}\n",
                    column.name,
                    optional,
                    column.options.join(" | ")
                ));
            }
        }
        out.push_str(&format!("\n{}:\n", exercise.label_header));
        for (n, q) in exercise.questions.iter().enumerate() {
            let example = if q.example { " [example]" } else { "" };
            out.push_str(&format!("  {}. {}{}\n", n + 1, q.label, example));
            if !q.prompt.is_empty() && q.prompt != q.label {
                out.push_str(&format!("     {}\n", q.prompt));
            }
            if let Some(url) = exercise.image_url(&q.label) {
                out.push_str(&format!("     diagram: {url}\n"));
            }
        }
    } else {
        out.push('\n');
        for (n, q) in exercise.questions.iter().enumerate() {
            out.push_str(&format!("  {}. {}\n", n + 1, q.display_text()));
            let options = q.options.as_ref().map(Options::labels).unwrap_or_default();
            out.push_str(&format!("     options: {}\n", options.join(", ")));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use phonoquiz_core::catalog::find_builtin;

    #[test]
    fn row_page_lists_columns_and_marks_example() {
        let page = render_page(&find_builtin("f").unwrap().unwrap());
        assert!(page.contains("Columns:"));
        assert!(page.contains("Voicing:"));
        assert!(page.contains("adder [example]"));
    }

    #[test]
    fn diagram_urls_are_shown() {
        let page = render_page(&find_builtin("d").unwrap().unwrap());
        assert!(page.contains("diagram: https://"));
        assert!(page.contains("(optional)"));
    }

    #[test]
    fn choice_page_lists_options() {
        let page = render_page(&find_builtin("k").unwrap().unwrap());
        assert!(page.contains("options: 1, 2, 3, 4, 5, 6, 7"));
        assert!(!page.contains("Columns:"));
    }
}
