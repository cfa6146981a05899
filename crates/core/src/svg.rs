//! SVG renderer: converts `RenderCommand` lists into standalone SVG strings.

use hcm_timeline_protocol::{Paint, RenderCommand, TextAlign, Viewport};

/// Render a frame as an SVG document sized to `viewport` in CSS pixels.
///
/// Gradients become `<linearGradient>` defs declared next to the shape that
/// uses them. Lane groups become `<g>` elements carrying the lane id.
pub fn render_svg(commands: &[RenderCommand], viewport: &Viewport) -> String {
    let (width, height) = (viewport.width, viewport.height);
    let mut svg = String::with_capacity(commands.len() * 160);
    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {width} {height}" width="{width}" height="{height}" style="font-family:system-ui,-apple-system,sans-serif">"#,
    ));

    let mut gradients = 0usize;
    let mut open_groups = 0usize;

    for cmd in commands {
        match cmd {
            RenderCommand::DrawRect {
                rect, fill, border, ..
            } => {
                let fill_attr = match fill {
                    Paint::VerticalGradient { top, bottom } => {
                        gradients += 1;
                        let id = format!("g{gradients}");
                        svg.push_str(&format!(
                            r#"<defs><linearGradient id="{id}" x1="0" y1="0" x2="0" y2="1"><stop offset="0" stop-color="{}"/><stop offset="1" stop-color="{}"/></linearGradient></defs>"#,
                            top.to_css(),
                            bottom.to_css(),
                        ));
                        format!("url(#{id})")
                    }
                    other => other.flatten().to_css(),
                };
                svg.push_str(&format!(
                    r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{fill_attr}""#,
                    rect.x, rect.y, rect.w, rect.h,
                ));
                if let Some(border) = border {
                    svg.push_str(&format!(
                        r#" stroke="{}" stroke-width="1""#,
                        border.flatten().to_css()
                    ));
                }
                svg.push_str("/>");
            }
            RenderCommand::DrawLine {
                from,
                to,
                color,
                width: line_width,
                dash,
            } => {
                svg.push_str(&format!(
                    r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="{line_width}""#,
                    from.x,
                    from.y,
                    to.x,
                    to.y,
                    color.flatten().to_css(),
                ));
                if let Some((on, off)) = dash {
                    svg.push_str(&format!(r#" stroke-dasharray="{on} {off}""#));
                }
                svg.push_str("/>");
            }
            RenderCommand::DrawText {
                position,
                text,
                color,
                font_size,
                align,
                bold,
            } => {
                let anchor = match align {
                    TextAlign::Left => "start",
                    TextAlign::Center => "middle",
                    TextAlign::Right => "end",
                };
                let weight = if *bold { "bold" } else { "normal" };
                svg.push_str(&format!(
                    r#"<text x="{}" y="{}" fill="{}" font-size="{font_size}" font-weight="{weight}" text-anchor="{anchor}" dominant-baseline="middle">{}</text>"#,
                    position.x,
                    position.y,
                    color.flatten().to_css(),
                    escape_xml(text),
                ));
            }
            RenderCommand::BeginGroup { id, label } => {
                open_groups += 1;
                svg.push_str(&format!(r#"<g data-id="{}">"#, escape_xml(id)));
                if let Some(label) = label {
                    svg.push_str(&format!("<title>{}</title>", escape_xml(label)));
                }
            }
            RenderCommand::EndGroup => {
                if open_groups > 0 {
                    open_groups -= 1;
                    svg.push_str("</g>");
                }
            }
        }
    }

    for _ in 0..open_groups {
        svg.push_str("</g>");
    }
    svg.push_str("</svg>");
    svg
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
