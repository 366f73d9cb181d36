//! File-backed image source.
//!
//! Reads and decodes images on a worker thread; results travel back over a
//! channel and reach their listeners when the UI thread calls
//! [`FileImageSource::poll`].

use crate::decode::DecodedImage;
use crate::decode::decode_image;
use nh_core::RenderError;
use nh_core::RenderResult;
use nh_render::Size;
use nh_render::img::FetchOutcome;
use nh_render::img::ImageListener;
use nh_render::img::ImageSource;
use nh_render::img::Subscription;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::mpsc;
use std::thread;
use tracing::debug;
use tracing::warn;
use url::Url;

struct Job {
    id: u64,
    uri: String,
}

struct Completion {
    id: u64,
    uri: String,
    result: RenderResult<DecodedImage>,
}

#[derive(Default)]
struct Listeners {
    next_id: u64,
    pending: HashMap<u64, ImageListener>,
}

pub struct FileImageSource {
    jobs: Option<mpsc::Sender<Job>>,
    completions: mpsc::Receiver<Completion>,
    listeners: Rc<RefCell<Listeners>>,
    decoded: RefCell<HashMap<String, DecodedImage>>,
}

impl FileImageSource {
    pub fn spawn() -> Result<Self, String> {
        let (job_tx, job_rx) = mpsc::channel::<Job>();
        let (done_tx, done_rx) = mpsc::channel();

        thread::Builder::new()
            .name("nh-image-loader".to_owned())
            .spawn(move || {
                for job in job_rx {
                    let result = load(&job.uri);
                    if done_tx
                        .send(Completion {
                            id: job.id,
                            uri: job.uri,
                            result,
                        })
                        .is_err()
                    {
                        break;
                    }
                }
            })
            .map_err(|error| format!("failed to spawn image loader: {error}"))?;

        Ok(Self {
            jobs: Some(job_tx),
            completions: done_rx,
            listeners: Rc::default(),
            decoded: RefCell::default(),
        })
    }

    /// Delivers finished loads to their listeners. Returns how many were
    /// delivered.
    pub fn poll(&self) -> usize {
        let mut delivered = 0;
        while let Ok(completion) = self.completions.try_recv() {
            let outcome = match completion.result {
                Ok(image) => {
                    let natural = Size::new(image.width as f32, image.height as f32);
                    self.decoded
                        .borrow_mut()
                        .insert(completion.uri.clone(), image);
                    FetchOutcome::Loaded { natural }
                }
                Err(error) => {
                    warn!(uri = %completion.uri, code = error.code(), %error, "image load failed");
                    FetchOutcome::Failed(error)
                }
            };

            let listener = self.listeners.borrow_mut().pending.remove(&completion.id);
            match listener {
                Some(listener) => {
                    listener(outcome);
                    delivered += 1;
                }
                None => debug!(uri = %completion.uri, "load finished after unsubscribe"),
            }
        }
        delivered
    }

    /// Takes decoded pixels that have not been uploaded yet.
    pub fn take_decoded(&self) -> Vec<(String, DecodedImage)> {
        self.decoded.borrow_mut().drain().collect()
    }

    pub fn pending(&self) -> usize {
        self.listeners.borrow().pending.len()
    }
}

impl ImageSource for FileImageSource {
    fn subscribe(&self, uri: &str, listener: ImageListener) -> Subscription {
        let id = {
            let mut listeners = self.listeners.borrow_mut();
            let id = listeners.next_id;
            listeners.next_id += 1;
            listeners.pending.insert(id, listener);
            id
        };

        let queued = self.jobs.as_ref().is_some_and(|jobs| {
            jobs.send(Job {
                id,
                uri: uri.to_owned(),
            })
            .is_ok()
        });
        if !queued {
            let listener = self.listeners.borrow_mut().pending.remove(&id);
            if let Some(listener) = listener {
                listener(FetchOutcome::Failed(RenderError::resource(
                    "preview.img.loader_stopped",
                    uri,
                    "image loader is not running",
                )));
            }
            return Subscription::detached();
        }

        let listeners = Rc::downgrade(&self.listeners);
        Subscription::new(move || {
            if let Some(listeners) = listeners.upgrade() {
                listeners.borrow_mut().pending.remove(&id);
            }
        })
    }
}

impl Drop for FileImageSource {
    fn drop(&mut self) {
        // Closing the job channel stops the worker.
        self.jobs.take();
    }
}

fn load(uri: &str) -> RenderResult<DecodedImage> {
    let url = Url::parse(uri)
        .map_err(|error| RenderError::resource("preview.img.invalid_uri", uri, error.to_string()))?;
    match url.scheme() {
        "file" => {
            let path = url.to_file_path().map_err(|()| {
                RenderError::resource("preview.img.invalid_uri", uri, "not a local path")
            })?;
            let body = std::fs::read(&path).map_err(|error| {
                RenderError::resource("preview.img.read_failed", uri, error.to_string())
            })?;
            decode_image(uri, &body)
        }
        scheme => Err(RenderError::resource(
            "preview.img.unsupported_scheme",
            uri,
            format!("{scheme} images are not loaded by the preview"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::FileImageSource;
    use nh_render::img::FetchOutcome;
    use nh_render::img::ImageSource;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;
    use std::time::Instant;

    fn wait_for(source: &FileImageSource) -> usize {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            let delivered = source.poll();
            if delivered > 0 || Instant::now() > deadline {
                return delivered;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn network_sources_fail() {
        let source = match FileImageSource::spawn() {
            Ok(source) => source,
            Err(e) => panic!("{e}"),
        };
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _subscription = source.subscribe(
            "https://example.com/cat.png",
            Box::new(move |outcome| sink.borrow_mut().push(outcome)),
        );

        assert_eq!(wait_for(&source), 1);
        assert!(matches!(
            seen.borrow().as_slice(),
            [FetchOutcome::Failed(error)] if error.code() == "preview.img.unsupported_scheme"
        ));
        assert_eq!(source.pending(), 0);
    }

    #[test]
    fn loads_local_svg() {
        let path = std::env::temp_dir().join(format!("nh-preview-{}.svg", std::process::id()));
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="6" height="3"/>"#;
        if let Err(e) = std::fs::write(&path, svg) {
            panic!("{e}");
        }
        let uri = match url::Url::from_file_path(&path) {
            Ok(url) => url.to_string(),
            Err(()) => panic!("temp path is not absolute"),
        };

        let source = match FileImageSource::spawn() {
            Ok(source) => source,
            Err(e) => panic!("{e}"),
        };
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _subscription =
            source.subscribe(&uri, Box::new(move |outcome| sink.borrow_mut().push(outcome)));

        assert_eq!(wait_for(&source), 1);
        let _ = std::fs::remove_file(&path);
        assert!(matches!(
            seen.borrow().as_slice(),
            [FetchOutcome::Loaded { natural }] if natural.width == 6.0 && natural.height == 3.0
        ));
        assert_eq!(source.take_decoded().len(), 1);
    }

    #[test]
    fn unsubscribed_loads_are_not_delivered() {
        let source = match FileImageSource::spawn() {
            Ok(source) => source,
            Err(e) => panic!("{e}"),
        };
        let seen = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&seen);
        source
            .subscribe(
                "https://example.com/gone.png",
                Box::new(move |_| *sink.borrow_mut() += 1),
            )
            .unsubscribe();

        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(source.poll(), 0);
        assert_eq!(*seen.borrow(), 0);
    }
}
