//! Desktop preview: renders an HTML file to a native element tree and paints
//! it with egui.

mod decode;
mod paint;
mod source;

use clap::Parser;
use eframe::egui;
use nh_render::NoScaling;
use nh_render::RenderConfig;
use nh_renderer::HtmlRenderer;
use nh_renderer::RenderedDocument;
use paint::PaintResources;
use source::FileImageSource;
use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;
use tracing::error;
use tracing::info;
use url::Url;

const LOADING_REPAINT_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Parser, Debug)]
#[command(name = "nh-preview", version, about = "Preview HTML rendered as native elements", long_about = None)]
struct Args {
    /// HTML file to render
    html: PathBuf,

    /// Width available to the document, in logical pixels
    #[arg(long, default_value_t = 720.0)]
    content_width: f32,

    /// Keep images at their resolved size instead of fitting the content width
    #[arg(long)]
    no_scaling: bool,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_filter: String,
}

#[derive(Debug, Clone)]
struct LinkPress {
    href: String,
    target: String,
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_filter)),
        )
        .with_target(false)
        .init();

    let app = match PreviewApp::open(&args) {
        Ok(app) => app,
        Err(message) => {
            error!(%message, "failed to open preview");
            return ExitCode::FAILURE;
        }
    };

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("nh-preview")
            .with_inner_size([args.content_width + 80.0, 840.0])
            .with_min_inner_size([320.0, 240.0]),
        ..Default::default()
    };

    match eframe::run_native(
        "nh-preview",
        native_options,
        Box::new(|_cc| Ok(Box::new(app))),
    ) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!(%error, "preview window failed");
            ExitCode::FAILURE
        }
    }
}

struct PreviewApp {
    renderer: HtmlRenderer,
    source: Rc<FileImageSource>,
    document: RenderedDocument,
    current: PathBuf,
    presses: Arc<Mutex<Vec<LinkPress>>>,
    textures: HashMap<String, egui::TextureHandle>,
    status_line: String,
}

impl PreviewApp {
    fn open(args: &Args) -> Result<Self, String> {
        let presses = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&presses);

        let mut config = RenderConfig::builder()
            .content_width(args.content_width)
            .on_link_press(move |_event, href, _attributes, target| {
                info!(href, target, "link pressed");
                if let Ok(mut presses) = sink.lock() {
                    presses.push(LinkPress {
                        href: href.to_owned(),
                        target: target.to_owned(),
                    });
                }
            });
        if args.no_scaling {
            config = config.embedded_max_width(NoScaling);
        }
        let config = config.build().map_err(|error| error.to_string())?;
        let renderer = HtmlRenderer::with_config(config).map_err(|error| error.to_string())?;

        let source = Rc::new(FileImageSource::spawn()?);
        let (html, base) = read_page(&args.html)?;
        let renderer = renderer.with_base_url(base);
        let document = renderer.load(&html, source.clone());

        Ok(Self {
            renderer,
            source,
            document,
            current: args.html.clone(),
            presses,
            textures: HashMap::new(),
            status_line: format!("Opened {}", args.html.display()),
        })
    }

    fn navigate(&mut self, path: PathBuf) {
        match read_page(&path) {
            Ok((html, base)) => {
                self.renderer = self.renderer.with_base_url(base);
                self.document = self.renderer.load(&html, self.source.clone());
                self.status_line = format!("Opened {}", path.display());
                self.current = path;
            }
            Err(message) => {
                error!(%message, "navigation failed");
                self.status_line = message;
            }
        }
    }

    fn reload(&mut self) {
        match read_page(&self.current) {
            Ok((html, _)) => {
                self.document.update(&html);
                self.status_line = format!("Reloaded {}", self.current.display());
            }
            Err(message) => self.status_line = message,
        }
    }

    /// Local pages opened in the same frame replace the document; anything
    /// else is only reported.
    fn handle_presses(&mut self) {
        let presses = match self.presses.lock() {
            Ok(mut presses) => std::mem::take(&mut *presses),
            Err(_) => return,
        };

        for press in presses {
            let local = Url::parse(&press.href)
                .ok()
                .filter(|url| url.scheme() == "file")
                .and_then(|url| url.to_file_path().ok());
            match local {
                Some(path) if press.target != "_blank" => self.navigate(path),
                _ => {
                    self.status_line = format!("Link: {} (target {})", press.href, press.target);
                }
            }
        }
    }

    fn upload_textures(&mut self, ctx: &egui::Context) {
        for (uri, image) in self.source.take_decoded() {
            let texture = ctx.load_texture(
                format!("img:{uri}"),
                egui::ColorImage::from_rgba_unmultiplied([image.width, image.height], &image.rgba),
                egui::TextureOptions::LINEAR,
            );
            self.textures.insert(uri, texture);
        }
    }
}

impl eframe::App for PreviewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.source.poll() > 0 {
            self.upload_textures(ctx);
        }
        self.document.pump();
        self.handle_presses();

        if self.source.pending() > 0 {
            ctx.request_repaint_after(LOADING_REPAINT_INTERVAL);
        }

        egui::TopBottomPanel::top("toolbar_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("Reload").clicked() {
                    self.reload();
                }
                ui.separator();
                let title = self.document.document().metadata.title.clone();
                ui.label(title.unwrap_or_else(|| self.current.display().to_string()));
                if self.source.pending() > 0 {
                    ui.separator();
                    ui.spinner();
                }
            });
        });

        egui::TopBottomPanel::bottom("status_panel").show(ctx, |ui| {
            ui.label(&self.status_line);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .id_salt("document_scroll")
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    let resources = PaintResources {
                        textures: &self.textures,
                    };
                    paint::paint(ui, self.document.tree(), &resources);
                });
        });
    }
}

/// Reads and decodes a page; the returned base URL points at the file itself
/// so relative `src` and `href` values resolve next to it.
fn read_page(path: &Path) -> Result<(String, String), String> {
    let body = std::fs::read(path)
        .map_err(|error| format!("failed to read {}: {error}", path.display()))?;
    let absolute = path
        .canonicalize()
        .map_err(|error| format!("failed to resolve {}: {error}", path.display()))?;
    let base = Url::from_file_path(&absolute)
        .map_err(|()| format!("{} is not a local path", absolute.display()))?;
    Ok((decode::decode_html(&body), base.to_string()))
}
