use crate::stripe::Stripe;

/// Plain-text view of the faces the viewer currently sees, one line per
/// stripe. Keeps the last frame so hosts can skip redrawing unchanged output.
#[derive(Debug, Default)]
pub struct TextRenderer {
    width: usize,
    last_frame: Vec<String>,
}

impl TextRenderer {
    pub fn new(width: usize) -> Self {
        Self {
            width,
            last_frame: Vec::new(),
        }
    }

    /// Builds the frame for `stripes` without remembering it.
    pub fn frame(&self, stripes: &[Stripe]) -> Vec<String> {
        stripes
            .iter()
            .map(|stripe| {
                let text = stripe
                    .visible_face()
                    .html()
                    .map(strip_markup)
                    .unwrap_or_default();
                let text: String = text.chars().take(self.width).collect();
                format!(
                    "{:>2} {:>5}° | {:<width$} |",
                    stripe.index(),
                    stripe.applied_angle(),
                    text,
                    width = self.width
                )
            })
            .collect()
    }

    /// Returns the new frame only when it differs from the previous draw.
    pub fn draw(&mut self, stripes: &[Stripe]) -> Option<&[String]> {
        let frame = self.frame(stripes);
        if frame == self.last_frame {
            return None;
        }
        self.last_frame = frame;
        Some(&self.last_frame)
    }
}

/// Drops tags and collapses whitespace so a markup fragment fits one line.
pub fn strip_markup(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                text.push(' ');
            }
            _ if !in_tag => text.push(ch),
            _ => {}
        }
    }
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}
