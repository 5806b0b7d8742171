//! Résumé layout — builds a story of blocks from a `TailoredResume`, then flows
//! it onto pages with greedy word-wrap.
//!
//! # Story rules
//! - Header: name (or `Anonymous Candidate`), then one contact line joined by
//!   middle dots, omitted when no contact field is present.
//! - Headline and summary paragraphs, each omitted when absent.
//! - Sections: Education, Experience, Projects first (case-insensitive, in that
//!   order), then the rest in their original order. Empty sections are skipped.
//! - Each item is followed by a fixed small spacer.
//!
//! # Flow
//! Lines are placed top-down; when the next line would cross the bottom margin a
//! new page starts. There is no other pagination logic.

use crate::models::resume::{ResumeItem, ResumeSection, TailoredResume};
use crate::render::font_metrics::FontFace;

pub const FALLBACK_NAME: &str = "Anonymous Candidate";
const SEPARATOR: &str = " \u{00B7} ";
const DASH: &str = " \u{2014} ";
const BULLET_MARKER: &str = "\u{2022}";
const BULLET_INDENT: f32 = 15.0;
const BULLET_MARKER_INDENT: f32 = 5.0;
const ITEM_SPACER: f32 = 4.0;
const SECTIONS_SPACER: f32 = 4.0;

// ────────────────────────────────────────────────────────────────────────────
// Geometry and styles
// ────────────────────────────────────────────────────────────────────────────

/// Page size and uniform margin, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
}

impl PageGeometry {
    /// US Letter with half-inch margins.
    pub const LETTER: PageGeometry = PageGeometry {
        width: 612.0,
        height: 792.0,
        margin: 36.0,
    };

    pub fn text_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }

    fn top(&self) -> f32 {
        self.height - self.margin
    }

    fn bottom(&self) -> f32 {
        self.margin
    }
}

#[derive(Debug, PartialEq)]
pub struct TextStyle {
    pub name: &'static str,
    pub font_size: f32,
    pub leading: f32,
    pub space_before: f32,
    pub space_after: f32,
    pub face: FontFace,
}

pub static NAME_STYLE: TextStyle = TextStyle {
    name: "Name",
    font_size: 18.0,
    leading: 22.0,
    space_before: 0.0,
    space_after: 4.0,
    face: FontFace::Bold,
};

pub static CONTACT_STYLE: TextStyle = TextStyle {
    name: "Contact",
    font_size: 9.0,
    leading: 12.0,
    space_before: 0.0,
    space_after: 8.0,
    face: FontFace::Regular,
};

pub static HEADLINE_STYLE: TextStyle = TextStyle {
    name: "Headline",
    font_size: 11.0,
    leading: 14.0,
    space_before: 0.0,
    space_after: 6.0,
    face: FontFace::Regular,
};

pub static SUMMARY_STYLE: TextStyle = TextStyle {
    name: "Summary",
    font_size: 10.0,
    leading: 13.0,
    space_before: 0.0,
    space_after: 10.0,
    face: FontFace::Regular,
};

pub static SECTION_TITLE_STYLE: TextStyle = TextStyle {
    name: "SectionTitle",
    font_size: 12.0,
    leading: 14.0,
    space_before: 10.0,
    space_after: 4.0,
    face: FontFace::Bold,
};

pub static ITEM_TITLE_STYLE: TextStyle = TextStyle {
    name: "ItemTitle",
    font_size: 10.5,
    leading: 13.0,
    space_before: 2.0,
    space_after: 0.0,
    face: FontFace::Regular,
};

pub static META_STYLE: TextStyle = TextStyle {
    name: "MetaLine",
    font_size: 9.0,
    leading: 11.0,
    space_before: 0.0,
    space_after: 2.0,
    face: FontFace::Regular,
};

pub static BULLET_STYLE: TextStyle = TextStyle {
    name: "Bullet",
    font_size: 10.0,
    leading: 13.0,
    space_before: 0.0,
    space_after: 0.0,
    face: FontFace::Regular,
};

// ────────────────────────────────────────────────────────────────────────────
// Story
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub text: String,
    pub face: FontFace,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Paragraph {
        spans: Vec<Span>,
        style: &'static TextStyle,
    },
    Bullets {
        items: Vec<String>,
        style: &'static TextStyle,
    },
    Spacer(f32),
}

impl Block {
    fn text(text: impl Into<String>, style: &'static TextStyle) -> Self {
        Block::Paragraph {
            spans: vec![Span {
                text: text.into(),
                face: style.face,
            }],
            style,
        }
    }

    /// A bold lead followed by regular text, e.g. `**Engineer** · Acme`.
    fn lead(lead: &str, rest: Option<String>, style: &'static TextStyle) -> Self {
        let mut spans = vec![Span {
            text: lead.to_string(),
            face: FontFace::Bold,
        }];
        if let Some(rest) = rest {
            spans.push(Span {
                text: rest,
                face: FontFace::Regular,
            });
        }
        Block::Paragraph { spans, style }
    }

    /// Plain text of a paragraph, for inspection.
    pub fn plain_text(&self) -> Option<String> {
        match self {
            Block::Paragraph { spans, .. } => {
                Some(spans.iter().map(|s| s.text.as_str()).collect::<String>())
            }
            _ => None,
        }
    }
}

/// The three sections with a fixed place at the top of the résumé.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Education,
    Experience,
    Projects,
    Other,
}

/// Promotion order of known sections. Unlisted titles rank after all of these.
const SECTION_PRIORITY: [(&str, SectionKind); 3] = [
    ("education", SectionKind::Education),
    ("experience", SectionKind::Experience),
    ("projects", SectionKind::Projects),
];

impl SectionKind {
    pub fn classify(title: &str) -> Self {
        let lower = title.to_lowercase();
        SECTION_PRIORITY
            .iter()
            .find(|(known, _)| *known == lower)
            .map(|(_, kind)| *kind)
            .unwrap_or(SectionKind::Other)
    }

    fn priority(self) -> usize {
        SECTION_PRIORITY
            .iter()
            .position(|(_, kind)| *kind == self)
            .unwrap_or(SECTION_PRIORITY.len())
    }
}

/// Stable sort by priority: known sections first, everything else in original order.
pub fn order_sections(sections: &[ResumeSection]) -> Vec<&ResumeSection> {
    let mut ordered: Vec<&ResumeSection> = sections.iter().collect();
    ordered.sort_by_key(|s| SectionKind::classify(&s.title).priority());
    ordered
}

pub fn build_story(resume: &TailoredResume) -> Vec<Block> {
    let mut story = Vec::new();

    let name = non_empty(resume.contact.name.as_deref()).unwrap_or(FALLBACK_NAME);
    story.push(Block::text(name, &NAME_STYLE));

    let contact_parts = resume.contact.display_parts();
    if !contact_parts.is_empty() {
        story.push(Block::text(contact_parts.join(SEPARATOR), &CONTACT_STYLE));
    }

    if let Some(headline) = non_empty(resume.headline.as_deref()) {
        story.push(Block::text(headline, &HEADLINE_STYLE));
    }
    if let Some(summary) = non_empty(resume.summary.as_deref()) {
        story.push(Block::text(summary, &SUMMARY_STYLE));
    }

    story.push(Block::Spacer(SECTIONS_SPACER));

    for section in order_sections(&resume.sections) {
        if section.items.is_empty() {
            continue;
        }
        story.push(Block::text(section.title.to_uppercase(), &SECTION_TITLE_STYLE));

        let kind = SectionKind::classify(&section.title);
        for item in &section.items {
            match kind {
                SectionKind::Education => education_item(&mut story, item),
                SectionKind::Experience => experience_item(&mut story, item),
                SectionKind::Projects | SectionKind::Other => generic_item(&mut story, item),
            }
            story.push(Block::Spacer(ITEM_SPACER));
        }
    }

    story
}

fn education_item(story: &mut Vec<Block>, item: &ResumeItem) {
    let institution = item.text("institution").unwrap_or_default();
    let degree = item.text("degree").map(|d| format!("{DASH}{d}"));
    if !institution.is_empty() || degree.is_some() {
        story.push(Block::lead(&institution, degree, &ITEM_TITLE_STYLE));
    }

    let graduation = item.text("graduation").or_else(|| item.text("graduation_date"));
    push_meta(story, [item.text("location"), graduation]);

    let coursework = item.list("coursework");
    if !coursework.is_empty() {
        story.push(Block::text(
            format!("Relevant coursework: {}", coursework.join(", ")),
            &BULLET_STYLE,
        ));
    }
}

fn experience_item(story: &mut Vec<Block>, item: &ResumeItem) {
    let role = item.text("role").unwrap_or_default();
    let company = item.text("company").map(|c| format!("{SEPARATOR}{c}"));
    if !role.is_empty() || company.is_some() {
        story.push(Block::lead(&role, company, &ITEM_TITLE_STYLE));
    }

    let dates = date_range(item.text("start_date"), item.text("end_date"));
    push_meta(story, [item.text("location"), dates]);
    push_bullets(story, item.list("bullets"));
}

fn generic_item(story: &mut Vec<Block>, item: &ResumeItem) {
    if let Some(name) = item.text("name").or_else(|| item.text("title")) {
        story.push(Block::lead(&name, None, &ITEM_TITLE_STYLE));
    }

    let tech_stack = item.list("tech_stack");
    if !tech_stack.is_empty() {
        story.push(Block::text(format!("Tech: {}", tech_stack.join(", ")), &META_STYLE));
    }
    push_bullets(story, item.list("bullets"));
}

fn push_meta<const N: usize>(story: &mut Vec<Block>, parts: [Option<String>; N]) {
    let parts: Vec<String> = parts.into_iter().flatten().collect();
    if !parts.is_empty() {
        story.push(Block::text(parts.join(SEPARATOR), &META_STYLE));
    }
}

fn push_bullets(story: &mut Vec<Block>, bullets: Vec<String>) {
    if !bullets.is_empty() {
        story.push(Block::Bullets {
            items: bullets,
            style: &BULLET_STYLE,
        });
    }
}

fn date_range(start: Option<String>, end: Option<String>) -> Option<String> {
    match (start, end) {
        (Some(start), Some(end)) => Some(format!("{start}{DASH}{end}")),
        (Some(start), None) => Some(format!("{start}{}", DASH.trim_end())),
        (None, Some(end)) => Some(end),
        (None, None) => None,
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

// ────────────────────────────────────────────────────────────────────────────
// Flow layout
// ────────────────────────────────────────────────────────────────────────────

/// A run of text at an absolute baseline position.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedRun {
    pub x: f32,
    pub y: f32,
    pub font_size: f32,
    pub face: FontFace,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaidOutPage {
    pub runs: Vec<PlacedRun>,
}

/// Same-face words on one wrapped line, offset from the line start.
#[derive(Debug, Clone, PartialEq)]
struct LineRun {
    offset: f32,
    face: FontFace,
    text: String,
}

struct Cursor<'g> {
    geometry: &'g PageGeometry,
    pages: Vec<LaidOutPage>,
    y: f32,
}

impl<'g> Cursor<'g> {
    fn new(geometry: &'g PageGeometry) -> Self {
        Self {
            geometry,
            pages: vec![LaidOutPage::default()],
            y: geometry.top(),
        }
    }

    fn at_top(&self) -> bool {
        self.y >= self.geometry.top()
    }

    fn advance(&mut self, dy: f32) {
        if !self.at_top() {
            self.y -= dy;
        }
    }

    fn place(&mut self, run: PlacedRun) {
        if let Some(page) = self.pages.last_mut() {
            page.runs.push(run);
        }
    }

    /// Places one line at `x`, breaking the page first if it would not fit.
    /// Returns the baseline used.
    fn place_line(&mut self, line: Vec<LineRun>, x: f32, style: &TextStyle) -> f32 {
        if !self.at_top() && self.y - style.leading < self.geometry.bottom() {
            self.pages.push(LaidOutPage::default());
            self.y = self.geometry.top();
        }
        let baseline = self.y - style.font_size;
        for run in line {
            self.place(PlacedRun {
                x: x + run.offset,
                y: baseline,
                font_size: style.font_size,
                face: run.face,
                text: run.text,
            });
        }
        self.y -= style.leading;
        baseline
    }
}

pub fn layout(story: &[Block], geometry: &PageGeometry) -> Vec<LaidOutPage> {
    let mut cursor = Cursor::new(geometry);
    let left = geometry.margin;

    for block in story {
        match block {
            Block::Paragraph { spans, style } => {
                cursor.advance(style.space_before);
                for line in wrap_spans(spans, geometry.text_width(), style.font_size) {
                    cursor.place_line(line, left, style);
                }
                cursor.advance(style.space_after);
            }
            Block::Bullets { items, style } => {
                let width = geometry.text_width() - BULLET_INDENT;
                for item in items {
                    let spans = [Span {
                        text: item.clone(),
                        face: style.face,
                    }];
                    for (i, line) in wrap_spans(&spans, width, style.font_size).into_iter().enumerate() {
                        let baseline = cursor.place_line(line, left + BULLET_INDENT, style);
                        if i == 0 {
                            cursor.place(PlacedRun {
                                x: left + BULLET_MARKER_INDENT,
                                y: baseline,
                                font_size: style.font_size,
                                face: style.face,
                                text: BULLET_MARKER.to_string(),
                            });
                        }
                    }
                    cursor.advance(style.space_after);
                }
            }
            Block::Spacer(height) => cursor.advance(*height),
        }
    }

    cursor.pages
}

/// Greedy word-wrap over mixed-face spans. Span boundaries are word boundaries.
/// A word wider than the line gets a line of its own.
fn wrap_spans(spans: &[Span], max_width: f32, font_size: f32) -> Vec<Vec<LineRun>> {
    let words: Vec<(FontFace, &str)> = spans
        .iter()
        .flat_map(|span| span.text.split_whitespace().map(move |w| (span.face, w)))
        .collect();

    let mut lines: Vec<Vec<(FontFace, &str)>> = Vec::new();
    let mut current: Vec<(FontFace, &str)> = Vec::new();
    let mut current_width = 0.0_f32;

    for (face, word) in words {
        let metrics = face.metrics();
        let word_w = metrics.measure_pt(word, font_size);
        let space_w = if current.is_empty() {
            0.0
        } else {
            metrics.space_width * font_size
        };

        if !current.is_empty() && current_width + space_w + word_w > max_width {
            lines.push(std::mem::take(&mut current));
            current_width = word_w;
        } else {
            current_width += space_w + word_w;
        }
        current.push((face, word));
    }
    if !current.is_empty() {
        lines.push(current);
    }

    lines.iter().map(|line| line_runs(line, font_size)).collect()
}

fn line_runs(words: &[(FontFace, &str)], font_size: f32) -> Vec<LineRun> {
    let mut runs: Vec<LineRun> = Vec::new();
    let mut x = 0.0_f32;

    for (i, (face, word)) in words.iter().enumerate() {
        let metrics = face.metrics();
        if i > 0 {
            x += metrics.space_width * font_size;
        }
        match runs.last_mut() {
            Some(run) if run.face == *face => {
                run.text.push(' ');
                run.text.push_str(word);
            }
            _ => runs.push(LineRun {
                offset: x,
                face: *face,
                text: word.to_string(),
            }),
        }
        x += metrics.measure_pt(word, font_size);
    }
    runs
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
