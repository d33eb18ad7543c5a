//! LaTeX export of a paper summary.
//!
//! Produces a standalone `.tex` source file. Nothing here compiles LaTeX.

/// Escape LaTeX special characters in plain text.
pub fn escape_latex(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str(r"\textbackslash{}"),
            '{' => out.push_str(r"\{"),
            '}' => out.push_str(r"\}"),
            '$' => out.push_str(r"\$"),
            '&' => out.push_str(r"\&"),
            '#' => out.push_str(r"\#"),
            '%' => out.push_str(r"\%"),
            '_' => out.push_str(r"\_"),
            '^' => out.push_str(r"\textasciicircum{}"),
            '~' => out.push_str(r"\textasciitilde{}"),
            c => out.push(c),
        }
    }
    out
}

/// Render a summary as a complete LaTeX article.
///
/// Blank lines in the summary are kept as paragraph breaks. The keyword
/// section is omitted when there are no keywords.
pub fn render_summary_document(title: &str, summary: &str, keywords: &[String]) -> String {
    let mut doc = String::new();
    doc.push_str("\\documentclass{article}\n");
    doc.push_str("\\usepackage[utf8]{inputenc}\n");
    doc.push_str("\\usepackage[T1]{fontenc}\n\n");
    doc.push_str(&format!("\\title{{{}}}\n", escape_latex(title)));
    doc.push_str("\\date{}\n\n");
    doc.push_str("\\begin{document}\n\\maketitle\n\n");
    doc.push_str("\\section*{Summary}\n");

    let paragraphs: Vec<String> = summary
        .split("\n\n")
        .map(|p| p.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|p| !p.is_empty())
        .map(|p| escape_latex(&p))
        .collect();
    doc.push_str(&paragraphs.join("\n\n"));
    doc.push('\n');

    if !keywords.is_empty() {
        doc.push_str("\n\\section*{Keywords}\n");
        let items: Vec<String> = keywords.iter().map(|k| escape_latex(k)).collect();
        doc.push_str(&items.join(", "));
        doc.push('\n');
    }

    doc.push_str("\n\\end{document}\n");
    doc
}
