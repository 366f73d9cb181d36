//! Paints a native element tree with egui.

use eframe::egui;
use nh_css::Edges;
use nh_render::ContentFit;
use nh_render::ImageElement;
use nh_render::NativeElement;
use nh_render::PressEvent;
use nh_render::PressHandler;
use nh_render::Surface;
use nh_render::TextAlign;
use nh_render::TextElement;
use nh_render::ViewElement;
use std::collections::HashMap;

const LOADING_FILL: egui::Color32 = egui::Color32::from_rgb(38, 44, 54);
const FAILED_FILL: egui::Color32 = egui::Color32::from_rgb(58, 32, 36);
const BORDER_COLOR: egui::Color32 = egui::Color32::from_rgb(66, 78, 95);

pub struct PaintResources<'a> {
    pub textures: &'a HashMap<String, egui::TextureHandle>,
}

#[derive(Debug, Clone, Copy, Default)]
struct TextStyle {
    size: Option<f32>,
    strong: bool,
    italics: bool,
    underline: bool,
}

impl TextStyle {
    fn for_tag(self, tag: Option<&str>) -> Self {
        let mut out = self;
        match tag.unwrap_or_default() {
            "h1" => out.size = Some(30.0),
            "h2" => out.size = Some(24.0),
            "h3" => out.size = Some(20.0),
            "h4" | "h5" | "h6" => out.size = Some(17.0),
            "b" | "strong" => out.strong = true,
            "i" | "em" | "cite" => out.italics = true,
            "u" | "ins" => out.underline = true,
            _ => {}
        }
        if out.size.is_some() {
            out.strong = true;
        }
        out
    }

    fn rich(self, text: &str) -> egui::RichText {
        let mut rich = egui::RichText::new(text);
        if let Some(size) = self.size {
            rich = rich.size(size);
        }
        if self.strong {
            rich = rich.strong();
        }
        if self.italics {
            rich = rich.italics();
        }
        if self.underline {
            rich = rich.underline();
        }
        rich
    }
}

pub fn paint(ui: &mut egui::Ui, element: &NativeElement, resources: &PaintResources<'_>) {
    paint_block(ui, element, resources, TextStyle::default());
}

fn paint_block(
    ui: &mut egui::Ui,
    element: &NativeElement,
    resources: &PaintResources<'_>,
    style: TextStyle,
) {
    match element {
        NativeElement::View(view) => paint_view(ui, view, resources, style),
        NativeElement::Fragment(children) => paint_children(ui, children, resources, style),
        NativeElement::Text(text) if text.align == TextAlign::Center => {
            let style = style.for_tag(text.tag.as_deref());
            ui.vertical_centered(|ui| {
                let label = style.rich(&element.text_content());
                match &text.on_press {
                    Some(handler) => paint_link(ui, label, handler),
                    None => {
                        ui.label(label);
                    }
                }
            });
        }
        inline => {
            let inline = [inline];
            ui.horizontal_wrapped(|ui| paint_inline_run(ui, &inline, resources, style));
        }
    }
}

fn paint_view(
    ui: &mut egui::Ui,
    view: &ViewElement,
    resources: &PaintResources<'_>,
    style: TextStyle,
) {
    let box_style = &view.style;
    let style = style.for_tag(view.tag.as_deref());

    if let Some(top) = box_style.margin.top {
        ui.add_space(top);
    }

    let fill = match box_style.surface {
        Surface::Plain => egui::Color32::TRANSPARENT,
        Surface::Loading => LOADING_FILL,
        Surface::Failed => FAILED_FILL,
    };
    let border = max_edge(&box_style.border_width);
    let mut frame = egui::Frame::NONE
        .fill(fill)
        .inner_margin(max_edge(&box_style.padding))
        .outer_margin(box_style.margin.left.unwrap_or(0.0));
    if border > 0.0 {
        frame = frame.stroke(egui::Stroke::new(border, BORDER_COLOR));
    }

    let inner = frame.show(ui, |ui| {
        if let Some(width) = box_style.width {
            ui.set_max_width(width);
        }
        if box_style.width.is_some() || box_style.height.is_some() {
            ui.set_min_size(egui::vec2(
                box_style.width.unwrap_or(0.0),
                box_style.height.unwrap_or(0.0),
            ));
        }
        if box_style.center_content {
            ui.vertical_centered(|ui| paint_children(ui, &view.children, resources, style));
        } else {
            paint_children(ui, &view.children, resources, style);
        }
    });

    if let Some(handler) = &view.on_press {
        let response = inner.response.interact(egui::Sense::click());
        if response.clicked() {
            press(&response, handler);
        }
    }

    if let Some(bottom) = box_style.margin.bottom {
        ui.add_space(bottom);
    }
}

/// Views stack vertically; consecutive inline content shares one wrapped row.
fn paint_children(
    ui: &mut egui::Ui,
    children: &[NativeElement],
    resources: &PaintResources<'_>,
    style: TextStyle,
) {
    let mut flat = Vec::with_capacity(children.len());
    flatten(children, &mut flat);

    let mut run: Vec<&NativeElement> = Vec::new();
    for child in flat {
        if is_inline(child) {
            run.push(child);
            continue;
        }
        flush_run(ui, &mut run, resources, style);
        paint_block(ui, child, resources, style);
    }
    flush_run(ui, &mut run, resources, style);
}

fn flush_run(
    ui: &mut egui::Ui,
    run: &mut Vec<&NativeElement>,
    resources: &PaintResources<'_>,
    style: TextStyle,
) {
    if run.iter().all(|element| is_blank(element)) {
        run.clear();
        return;
    }
    ui.horizontal_wrapped(|ui| {
        ui.spacing_mut().item_spacing.x = 0.0;
        paint_inline_run(ui, run, resources, style);
    });
    run.clear();
}

fn paint_inline_run(
    ui: &mut egui::Ui,
    run: &[&NativeElement],
    resources: &PaintResources<'_>,
    style: TextStyle,
) {
    for element in run {
        paint_inline(ui, element, resources, style);
    }
}

fn paint_inline(
    ui: &mut egui::Ui,
    element: &NativeElement,
    resources: &PaintResources<'_>,
    style: TextStyle,
) {
    match element {
        NativeElement::RawText(text) if text == "\n" => ui.end_row(),
        NativeElement::RawText(text) => {
            ui.label(style.rich(text));
        }
        NativeElement::Text(text) => paint_text(ui, text, element, resources, style),
        NativeElement::Image(image) => paint_image(ui, image, resources),
        NativeElement::Fragment(children) => {
            for child in children {
                paint_inline(ui, child, resources, style);
            }
        }
        NativeElement::View(view) => {
            ui.vertical(|ui| paint_view(ui, view, resources, style));
        }
    }
}

fn paint_text(
    ui: &mut egui::Ui,
    text: &TextElement,
    element: &NativeElement,
    resources: &PaintResources<'_>,
    style: TextStyle,
) {
    let style = style.for_tag(text.tag.as_deref());
    match &text.on_press {
        Some(handler) => paint_link(ui, style.rich(&element.text_content()), handler),
        None => {
            for child in &text.children {
                paint_inline(ui, child, resources, style);
            }
        }
    }
}

fn paint_link(ui: &mut egui::Ui, label: egui::RichText, handler: &PressHandler) {
    let response = ui.link(label);
    if response.clicked() {
        press(&response, handler);
    }
}

fn paint_image(ui: &mut egui::Ui, image: &ImageElement, resources: &PaintResources<'_>) {
    let size = egui::vec2(image.size.width, image.size.height);
    let Some(texture) = resources.textures.get(&image.uri) else {
        let (rect, response) = ui.allocate_exact_size(size, egui::Sense::hover());
        ui.painter().rect_filled(rect, 0.0, LOADING_FILL);
        response.on_hover_text(image.accessibility_label.as_str());
        return;
    };

    let keep_ratio = image.content_fit != Some(ContentFit::Fill);
    ui.add(
        egui::Image::new((texture.id(), size))
            .fit_to_exact_size(size)
            .maintain_aspect_ratio(keep_ratio),
    )
    .on_hover_text(image.accessibility_label.as_str());
}

/// Reports the press position relative to the pressed widget.
fn press(response: &egui::Response, handler: &PressHandler) {
    let origin = response.rect.min;
    let position = response
        .interact_pointer_pos()
        .unwrap_or_else(|| response.rect.center());
    handler.press(&PressEvent {
        x: position.x - origin.x,
        y: position.y - origin.y,
    });
}

fn flatten<'e>(children: &'e [NativeElement], out: &mut Vec<&'e NativeElement>) {
    for child in children {
        match child {
            NativeElement::Fragment(nested) => flatten(nested, out),
            other => out.push(other),
        }
    }
}

fn is_inline(element: &NativeElement) -> bool {
    match element {
        NativeElement::RawText(_) | NativeElement::Image(_) => true,
        NativeElement::Text(text) => text.align == TextAlign::Start,
        NativeElement::View(_) | NativeElement::Fragment(_) => false,
    }
}

fn is_blank(element: &NativeElement) -> bool {
    matches!(element, NativeElement::RawText(text) if text.trim().is_empty() && text != "\n")
}

fn max_edge(edges: &Edges) -> f32 {
    [edges.top, edges.right, edges.bottom, edges.left]
        .into_iter()
        .flatten()
        .fold(0.0, f32::max)
}

#[cfg(test)]
mod tests {
    use super::TextStyle;
    use super::is_blank;
    use super::is_inline;
    use nh_render::NativeElement;
    use nh_render::TextAlign;
    use nh_render::TextElement;
    use nh_render::ViewElement;

    #[test]
    fn headings_are_sized_and_strong() {
        let style = TextStyle::default().for_tag(Some("h2"));
        assert_eq!(style.size, Some(24.0));
        assert!(style.strong);
        assert!(!TextStyle::default().for_tag(Some("span")).strong);
    }

    #[test]
    fn centered_text_is_not_inline() {
        let centered = NativeElement::Text(TextElement {
            align: TextAlign::Center,
            ..TextElement::default()
        });
        assert!(!is_inline(&centered));
        assert!(is_inline(&NativeElement::Text(TextElement::default())));
        assert!(!is_inline(&NativeElement::View(ViewElement::default())));
    }

    #[test]
    fn line_breaks_are_not_blank() {
        assert!(is_blank(&NativeElement::RawText("  ".to_owned())));
        assert!(!is_blank(&NativeElement::RawText("\n".to_owned())));
    }
}
