use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use egui::{ColorImage, Context, TextureHandle, TextureOptions};
use futures::channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};
use log::{debug, warn};
use parking_lot::Mutex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("Unsupported asset url: {0}")]
    UnsupportedUrl(String),
    #[error("Failed to read asset: {0}")]
    Read(#[from] std::io::Error),
    #[error("Failed to decode asset: {0}")]
    Decode(#[from] image::ImageError),
}

/// Lifecycle of one requested raster.
pub enum AssetState {
    Pending,
    Ready(TextureHandle),
    Failed,
}

struct DecodedAsset {
    size: [usize; 2],
    rgba: Vec<u8>,
}

type DecodeResult = (String, Result<DecodedAsset, AssetError>);

/// Url-keyed raster cache. Decoding runs off the UI thread; finished
/// results come back over a channel and are uploaded as textures during
/// [`drain`]. A frame whose asset is still pending or has failed simply
/// renders without it.
///
/// [`drain`]: AssetCache::drain
pub struct AssetCache {
    states: HashMap<String, AssetState>,
    inflight: Arc<Mutex<HashSet<String>>>,
    results_tx: UnboundedSender<DecodeResult>,
    results_rx: UnboundedReceiver<DecodeResult>,
}

impl Default for AssetCache {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetCache {
    pub fn new() -> Self {
        let (results_tx, results_rx) = unbounded();
        Self {
            states: HashMap::new(),
            inflight: Arc::new(Mutex::new(HashSet::new())),
            results_tx,
            results_rx,
        }
    }

    /// The texture for `url`, kicking off a decode on first sight. `None`
    /// until the decode lands (or forever, if it failed).
    pub fn texture(&mut self, url: &str) -> Option<&TextureHandle> {
        if !self.states.contains_key(url) {
            self.states.insert(url.to_owned(), AssetState::Pending);
            self.spawn_decode(url.to_owned());
        }
        match self.states.get(url) {
            Some(AssetState::Ready(handle)) => Some(handle),
            _ => None,
        }
    }

    pub fn state(&self, url: &str) -> Option<&AssetState> {
        self.states.get(url)
    }

    /// Uploads every decode result that arrived since the last pass.
    /// Returns whether anything changed, so the caller can repaint.
    pub fn drain(&mut self, ctx: &Context) -> bool {
        let mut updated = false;
        while let Ok(Some((url, result))) = self.results_rx.try_next() {
            match result {
                Ok(decoded) => {
                    debug!("asset ready: {url} ({}x{})", decoded.size[0], decoded.size[1]);
                    let image = ColorImage::from_rgba_unmultiplied(decoded.size, &decoded.rgba);
                    let handle = ctx.load_texture(url.clone(), image, TextureOptions::LINEAR);
                    self.states.insert(url, AssetState::Ready(handle));
                }
                Err(err) => {
                    warn!("asset failed: {url}: {err}");
                    self.states.insert(url, AssetState::Failed);
                }
            }
            updated = true;
        }
        updated
    }

    /// Forgets every cached entry. Decodes still in flight land again on
    /// the next [`Self::drain`].
    pub fn clear(&mut self) {
        self.states.clear();
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    fn spawn_decode(&self, url: String) {
        {
            let mut inflight = self.inflight.lock();
            if !inflight.insert(url.clone()) {
                return;
            }
        }
        let results_tx = self.results_tx.clone();
        let inflight = Arc::clone(&self.inflight);

        #[cfg(not(target_arch = "wasm32"))]
        std::thread::spawn(move || {
            let result = decode_blocking(&url);
            inflight.lock().remove(&url);
            // The receiver only goes away when the cache itself does.
            let _ = results_tx.unbounded_send((url, result));
        });

        // Web builds rely on externally resolved assets; nothing to fetch
        // from here.
        #[cfg(target_arch = "wasm32")]
        {
            inflight.lock().remove(&url);
            let _ = results_tx
                .unbounded_send((url.clone(), Err(AssetError::UnsupportedUrl(url))));
        }
    }
}

/// Reads and decodes a local raster. Accepts plain paths and `file://`
/// urls; anything with another scheme is refused.
#[cfg(not(target_arch = "wasm32"))]
fn decode_blocking(url: &str) -> Result<DecodedAsset, AssetError> {
    let path = match url.split_once("://") {
        Some(("file", rest)) => rest,
        Some(_) => return Err(AssetError::UnsupportedUrl(url.to_owned())),
        None => url,
    };
    let bytes = std::fs::read(path)?;
    let image = image::load_from_memory(&bytes)?;
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(DecodedAsset {
        size: [width as usize, height as usize],
        rgba: rgba.into_raw(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn drain_until_settled(cache: &mut AssetCache, ctx: &Context, url: &str) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while matches!(cache.state(url), Some(AssetState::Pending)) {
            cache.drain(ctx);
            if Instant::now() > deadline {
                panic!("decode never settled for {url}");
            }
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn first_request_is_pending() {
        let mut cache = AssetCache::new();
        assert!(cache.texture("missing-file.png").is_none());
        assert!(matches!(
            cache.state("missing-file.png"),
            Some(AssetState::Pending)
        ));
    }

    #[test]
    fn missing_file_settles_as_failed() {
        let ctx = Context::default();
        let mut cache = AssetCache::new();
        cache.texture("definitely-not-here.png");
        drain_until_settled(&mut cache, &ctx, "definitely-not-here.png");
        assert!(matches!(
            cache.state("definitely-not-here.png"),
            Some(AssetState::Failed)
        ));
    }

    #[test]
    fn remote_scheme_is_refused() {
        let ctx = Context::default();
        let mut cache = AssetCache::new();
        cache.texture("https://example.com/pic.png");
        drain_until_settled(&mut cache, &ctx, "https://example.com/pic.png");
        assert!(matches!(
            cache.state("https://example.com/pic.png"),
            Some(AssetState::Failed)
        ));
    }

    #[test]
    fn decoded_file_becomes_a_texture() {
        let ctx = Context::default();
        let dir = std::env::temp_dir().join("flipbook-asset-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("dot.png");
        // 1x1 white pixel.
        let mut png = Vec::new();
        {
            use image::ImageEncoder as _;
            image::codecs::png::PngEncoder::new(&mut png)
                .write_image(&[255, 255, 255, 255], 1, 1, image::ExtendedColorType::Rgba8)
                .unwrap();
        }
        std::fs::write(&path, png).unwrap();

        let url = path.display().to_string();
        let mut cache = AssetCache::new();
        cache.texture(&url);
        drain_until_settled(&mut cache, &ctx, &url);
        assert!(cache.texture(&url).is_some());
    }
}
