use std::fmt::Write as _;

use crate::data::model::{CellValue, Table};

use super::chart::ChartPair;
use super::Report;

/// Rendering of a missing cell in the preview table.
pub const MISSING_DISPLAY: &str = "-";

const TABLE_CLASSES: &str = "dataframe table table-hover table-striped";

/// Escape text for use in HTML content and attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

fn cell_text(cell: &CellValue) -> String {
    match cell {
        CellValue::Missing => MISSING_DISPLAY.to_string(),
        other => escape(&other.to_string()),
    }
}

/// Render a table with a leading row-index column.
pub fn table_to_html(table: &Table) -> String {
    let mut html = String::new();
    let _ = writeln!(html, "<table border=\"0\" class=\"{TABLE_CLASSES}\">");
    html.push_str("  <thead>\n    <tr style=\"text-align: right;\">\n      <th></th>\n");
    for name in table.column_names() {
        let _ = writeln!(html, "      <th>{}</th>", escape(name));
    }
    html.push_str("    </tr>\n  </thead>\n  <tbody>\n");
    for i in 0..table.n_rows() {
        let _ = writeln!(html, "    <tr>\n      <th>{i}</th>");
        for cell in table.row(i) {
            let _ = writeln!(html, "      <td>{}</td>", cell_text(cell));
        }
        html.push_str("    </tr>\n");
    }
    html.push_str("  </tbody>\n</table>\n");
    html
}

fn chart_figure(chart: &ChartPair) -> String {
    let title = escape(&chart.title);
    format!(
        "<figure class=\"chart\">\n  <a href=\"data:image/png;base64,{full}\" target=\"_blank\">\
         <img src=\"data:image/png;base64,{thumb}\" alt=\"{title}\"></a>\n  \
         <figcaption>{title}</figcaption>\n</figure>\n",
        full = chart.full,
        thumb = chart.thumb,
    )
}

const PAGE_HEAD: &str = "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
<title>ARFF dataset report</title>\n<style>\n\
body { font-family: sans-serif; margin: 2rem; }\n\
.error { color: #b00020; }\n\
.charts { display: flex; flex-wrap: wrap; gap: 1rem; }\n\
.chart img { width: 300px; border: 1px solid #ddd; }\n\
table { border-collapse: collapse; font-size: 0.85rem; }\n\
th, td { padding: 0.2rem 0.5rem; border-bottom: 1px solid #eee; }\n\
</style>\n</head>\n<body>\n<h1>ARFF dataset report</h1>\n";

const PAGE_TAIL: &str = "</body>\n</html>\n";

/// Full standalone page for a processed upload.
pub fn render_page(report: &Report) -> String {
    let mut html = String::from(PAGE_HEAD);
    let _ = writeln!(html, "<h2>{}</h2>", escape(&report.file_name));
    let _ = writeln!(
        html,
        "<p>{} rows &times; {} columns</p>",
        report.num_rows, report.num_cols
    );

    if let Some(col) = &report.stratify_column {
        let sizes = report.split_sizes;
        let _ = writeln!(
            html,
            "<p>Split stratified by <code>{}</code>: train {}, validation {}, test {}</p>",
            escape(col),
            sizes.train,
            sizes.validation,
            sizes.test
        );
    } else {
        let sizes = report.split_sizes;
        let _ = writeln!(
            html,
            "<p>Random split: train {}, validation {}, test {}</p>",
            sizes.train, sizes.validation, sizes.test
        );
    }

    let charts: Vec<&ChartPair> = report.charts.iter().collect();
    if !charts.is_empty() {
        html.push_str("<section class=\"charts\">\n");
        for chart in charts {
            html.push_str(&chart_figure(chart));
        }
        html.push_str("</section>\n");
    }

    if report.truncated {
        let _ = writeln!(
            html,
            "<p class=\"notice\">Showing the first {} of {} rows.</p>",
            report.preview_rows, report.num_rows
        );
    }
    html.push_str(&report.preview_html);
    html.push_str(PAGE_TAIL);
    html
}

/// Page carrying only a user-facing error message.
pub fn render_error_page(message: &str) -> String {
    format!(
        "{PAGE_HEAD}<p class=\"error\">{}</p>\n{PAGE_TAIL}",
        escape(message)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Column;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape("<a href='x'>&\"</a>"), "&lt;a href=&#39;x&#39;&gt;&amp;&quot;&lt;/a&gt;");
    }

    #[test]
    fn table_has_index_column_and_dash_for_missing() {
        let table = Table::new(vec![
            Column::new("n", vec![CellValue::Integer(1), CellValue::Missing]),
            Column::new("<s>", vec![CellValue::Text("tcp".into()), CellValue::Float(0.5)]),
        ])
        .unwrap();
        let html = table_to_html(&table);
        assert!(html.starts_with("<table border=\"0\" class=\"dataframe table table-hover table-striped\">"));
        assert!(html.contains("<th>&lt;s&gt;</th>"));
        assert!(html.contains("<th>1</th>\n      <td>-</td>\n      <td>0.5</td>"));
        assert_eq!(html.matches("<tr>").count(), 2);
    }

    #[test]
    fn error_page_escapes_message() {
        let page = render_error_page("bad <file>");
        assert!(page.contains("<p class=\"error\">bad &lt;file&gt;</p>"));
        assert!(page.ends_with("</html>\n"));
    }
}
