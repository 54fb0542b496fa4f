use crossterm::style::{style, Color, Stylize};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// 一段文字，可選擇顏色
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub text: String,
    pub color: Option<Color>,
}

impl Span {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: None,
        }
    }

    pub fn colored(text: impl Into<String>, color: Color) -> Self {
        Self {
            text: text.into(),
            color: Some(color),
        }
    }

    /// 終端機上的顯示寬度，全形字與 emoji 佔兩格
    fn width(&self) -> usize {
        self.text.width()
    }

    fn paint(&self, color_enabled: bool) -> String {
        match self.color {
            Some(color) if color_enabled => style(&self.text).with(color).to_string(),
            _ => self.text.clone(),
        }
    }
}

pub type Line = Vec<Span>;

fn line_width(line: &Line) -> usize {
    line.iter().map(Span::width).sum()
}

/// 將過長的行切成顯示寬度不超過 width 的多行，保留每段的顏色
pub fn fold_line(line: &Line, width: usize) -> Vec<Line> {
    if width == 0 || line_width(line) <= width {
        return vec![line.clone()];
    }

    let mut lines = Vec::new();
    let mut current: Line = Vec::new();
    let mut used = 0;

    for span in line {
        let mut chunk = String::new();
        for ch in span.text.chars() {
            let ch_width = ch.width().unwrap_or(0);
            if used > 0 && used + ch_width > width {
                if !chunk.is_empty() {
                    current.push(Span {
                        text: std::mem::take(&mut chunk),
                        color: span.color,
                    });
                }
                lines.push(std::mem::take(&mut current));
                used = 0;
            }
            chunk.push(ch);
            used += ch_width;
        }
        if !chunk.is_empty() {
            current.push(Span {
                text: chunk,
                color: span.color,
            });
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// 沒有標題列的兩欄表格：左欄是標籤，右欄是值（可多行）
#[derive(Debug, Default, Clone)]
pub struct KeyValueTable {
    rows: Vec<(String, Vec<Line>)>,
}

impl KeyValueTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_row(&mut self, label: &str, value: Vec<Line>) {
        self.rows.push((label.to_string(), value));
    }

    /// 單行純文字；含換行的字串會拆成多行
    pub fn add_text_row(&mut self, label: &str, value: &str) {
        let lines = value.split('\n').map(|l| vec![Span::plain(l)]).collect();
        self.add_row(label, lines);
    }

    pub fn add_spans_row(&mut self, label: &str, spans: Vec<Span>) {
        self.add_row(label, vec![spans]);
    }

    /// max_width 是整個表格的寬度上限；None 表示不折行
    pub fn render(&self, max_width: Option<usize>, color_enabled: bool) -> String {
        let label_width = self
            .rows
            .iter()
            .map(|(label, _)| label.width())
            .max()
            .unwrap_or(0);

        let natural_width = self
            .rows
            .iter()
            .flat_map(|(_, lines)| lines.iter().map(line_width))
            .max()
            .unwrap_or(0);

        // 邊框與內距共佔 7 個字元
        let value_width = match max_width {
            Some(max) => natural_width.min(max.saturating_sub(label_width + 7).max(10)),
            None => natural_width,
        };

        let border = |left: &str, mid: &str, right: &str| {
            format!(
                "{}{}{}{}{}\n",
                left,
                "─".repeat(label_width + 2),
                mid,
                "─".repeat(value_width + 2),
                right
            )
        };

        let mut out = border("┌", "┬", "┐");
        for (label, lines) in &self.rows {
            let folded: Vec<Line> = lines
                .iter()
                .flat_map(|line| fold_line(line, value_width))
                .collect();
            for (i, line) in folded.iter().enumerate() {
                let label_text = if i == 0 { label.as_str() } else { "" };
                let label_padding = label_width.saturating_sub(label_text.width());
                let painted: String = line.iter().map(|s| s.paint(color_enabled)).collect();
                let padding = value_width.saturating_sub(line_width(line));
                out.push_str(&format!(
                    "│ {}{} │ {}{} │\n",
                    label_text,
                    " ".repeat(label_padding),
                    painted,
                    " ".repeat(padding)
                ));
            }
        }
        out.push_str(&border("└", "┴", "┘"));
        out
    }
}
