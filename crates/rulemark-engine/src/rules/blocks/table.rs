//! Pipe tables, with and without the leading pipe on every row.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::ParseError;
use crate::output::{Element, ElementTree, Html, Output, RenderState, Tag, html};
use crate::parsing::{Capture, Node, NodeData, Parsed, Parser, State, Value};
use crate::rules::{Matcher, Rule};

/// Column alignment taken from the delimiter row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

impl Align {
    pub fn as_str(self) -> &'static str {
        match self {
            Align::Left => "left",
            Align::Center => "center",
            Align::Right => "right",
        }
    }

    /// Reads one delimiter cell such as `:--`, `:-:` or `--:`.
    pub fn from_delimiter(cell: &str) -> Option<Self> {
        static RIGHT: OnceLock<Regex> = OnceLock::new();
        static CENTER: OnceLock<Regex> = OnceLock::new();
        static LEFT: OnceLock<Regex> = OnceLock::new();
        let right = RIGHT.get_or_init(|| Regex::new(r"^ *-+: *$").expect("Invalid align regex"));
        let center =
            CENTER.get_or_init(|| Regex::new(r"^ *:-+: *$").expect("Invalid align regex"));
        let left = LEFT.get_or_init(|| Regex::new(r"^ *:-+ *$").expect("Invalid align regex"));

        if right.is_match(cell) {
            Some(Align::Right)
        } else if center.is_match(cell) {
            Some(Align::Center)
        } else if left.is_match(cell) {
            Some(Align::Left)
        } else {
            None
        }
    }
}

/// Which row syntax a table was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowStyle {
    /// Every row starts with `|`.
    Piped,
    /// Rows carry inner pipes only.
    Bare,
}

/// `| a | b |` rows under a `|---|---|` delimiter row.
pub fn table() -> Rule {
    let regex = Regex::new(r"^ *\|(.+)\n *\|( *[-:]+[-| :]*)\n((?: *\|.*(?:\n|$))*)\n*")
        .expect("Invalid table regex");
    Rule::new(Matcher::block(regex), |capture, parser, state| {
        parse_table(capture, parser, state, RowStyle::Piped)
    })
    .with_html(render_html)
    .with_element(render_element)
}

/// `a | b` rows under a `---|---` delimiter row; emits `table`.
pub fn nptable() -> Rule {
    let regex = Regex::new(r"^ *(\S.*\|.*)\n *([-:]+ *\|[-| :]*)\n((?:.*\|.*(?:\n|$))*)\n*")
        .expect("Invalid nptable regex");
    Rule::new(Matcher::block(regex), |capture, parser, state| {
        parse_table(capture, parser, state, RowStyle::Bare)
    })
}

fn row_split() -> &'static Regex {
    static ROW_SPLIT: OnceLock<Regex> = OnceLock::new();
    ROW_SPLIT.get_or_init(|| Regex::new(r" *\| *").expect("Invalid row split regex"))
}

fn parse_table(
    capture: &Capture,
    parser: &Parser<'_>,
    state: &mut State,
    style: RowStyle,
) -> Result<Parsed, ParseError> {
    static HEADER_TRIM: OnceLock<Regex> = OnceLock::new();
    static ALIGN_TRIM: OnceLock<Regex> = OnceLock::new();
    let header_trim =
        HEADER_TRIM.get_or_init(|| Regex::new(r"^ *| *\| *$").expect("Invalid header regex"));
    let align_trim =
        ALIGN_TRIM.get_or_init(|| Regex::new(r"^ *|\| *$").expect("Invalid align trim regex"));

    let header_text = header_trim.replace_all(capture.group(1), "");
    let align_text = align_trim.replace_all(capture.group(2), "");
    let align: Vec<Value> = row_split()
        .split(&align_text)
        .map(|cell| Align::from_delimiter(cell).map(Align::as_str).into())
        .collect();
    let rows = split_rows(capture.group(3), style);

    state.with_scope(true, |state| -> Result<Parsed, ParseError> {
        let header = parse_cells(row_split().split(&header_text), parser, state)?;
        let cells = rows
            .iter()
            .map(|row| parse_cells(row_split().split(row), parser, state).map(Value::List))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(NodeData::typed("table")
            .field("header", header)
            .field("align", align)
            .field("cells", cells)
            .into())
    })
}

/// Splits the body into one string per row, with outer pipes removed for
/// piped tables.
fn split_rows(body: &str, style: RowStyle) -> Vec<String> {
    static PIPED_END: OnceLock<Regex> = OnceLock::new();
    static BARE_END: OnceLock<Regex> = OnceLock::new();
    static PIPED_ROW_TRIM: OnceLock<Regex> = OnceLock::new();

    match style {
        RowStyle::Piped => {
            let end = PIPED_END
                .get_or_init(|| Regex::new(r"(?: *\| *)?\n$").expect("Invalid table end regex"));
            let row_trim = PIPED_ROW_TRIM
                .get_or_init(|| Regex::new(r"^ *\| *| *\| *$").expect("Invalid row trim regex"));
            end.replace(body, "")
                .split('\n')
                .map(|row| row_trim.replace_all(row, "").into_owned())
                .collect()
        }
        RowStyle::Bare => {
            let end =
                BARE_END.get_or_init(|| Regex::new(r"\n$").expect("Invalid nptable end regex"));
            end.replace(body, "").split('\n').map(str::to_string).collect()
        }
    }
}

fn parse_cells<'a>(
    cells: impl Iterator<Item = &'a str>,
    parser: &Parser<'_>,
    state: &mut State,
) -> Result<Vec<Value>, ParseError> {
    cells
        .map(|cell| parser.parse_nested(cell, state).map(Value::Nodes))
        .collect()
}

fn cell_style(node: &Node, column: usize) -> Option<String> {
    node.list("align")
        .get(column)
        .and_then(Value::as_str)
        .map(|align| format!("text-align:{align};"))
}

fn rows(node: &Node) -> impl Iterator<Item = &[Value]> {
    node.list("cells").iter().map(|row| row.as_list().unwrap_or(&[]))
}

fn cell_nodes(cell: &Value) -> &[Node] {
    cell.as_nodes().unwrap_or(&[])
}

fn render_html(node: &Node, output: &Output<'_, Html>, state: &RenderState) -> String {
    let headers: String = node
        .list("header")
        .iter()
        .enumerate()
        .map(|(i, cell)| {
            let style = cell_style(node, i);
            html::tag(
                "th",
                &output.render_all(cell_nodes(cell), state),
                &[("style", style.as_deref()), ("scope", Some("col"))],
            )
        })
        .collect();

    let body: String = rows(node)
        .map(|row| {
            let cols: String = row
                .iter()
                .enumerate()
                .map(|(c, cell)| {
                    let style = cell_style(node, c);
                    html::tag(
                        "td",
                        &output.render_all(cell_nodes(cell), state),
                        &[("style", style.as_deref())],
                    )
                })
                .collect();
            html::tag("tr", &cols, &[])
        })
        .collect();

    let thead = html::tag("thead", &html::tag("tr", &headers, &[]), &[]);
    let tbody = html::tag("tbody", &body, &[]);
    html::tag("table", &(thead + &tbody), &[])
}

fn render_element(node: &Node, output: &Output<'_, ElementTree>, state: &RenderState) -> Element {
    let headers = node.list("header").iter().enumerate().map(|(i, cell)| {
        let style = cell_style(node, i);
        Element::from(
            Tag::new("th")
                .key(Some(i.to_string().as_str()))
                .attr("style", style.as_deref())
                .attr("scope", Some("col"))
                .child(output.render_all(cell_nodes(cell), state)),
        )
    });

    let body = rows(node).enumerate().map(|(r, row)| {
        let cols = row.iter().enumerate().map(|(c, cell)| {
            let style = cell_style(node, c);
            Element::from(
                Tag::new("td")
                    .key(Some(c.to_string().as_str()))
                    .attr("style", style.as_deref())
                    .child(output.render_all(cell_nodes(cell), state)),
            )
        });
        Element::from(Tag::new("tr").key(Some(r.to_string().as_str())).children(cols))
    });

    Tag::new("table")
        .key(state.key())
        .child(
            Tag::new("thead")
                .key(Some("thead"))
                .child(Tag::new("tr").children(headers).into())
                .into(),
        )
        .child(Tag::new("tbody").key(Some("tbody")).children(body).into())
        .into()
}
