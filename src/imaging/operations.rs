//! High-level resize operation.
//!
//! [`resize_image`] combines the pure resolver with a backend and the
//! encoder, and wraps them in the file-level policy:
//!
//! ```text
//! extension check → identify → no-op shortcut → cache lookup
//!     → interceptor → resolve → size limits → decode → resample → encode
//! ```
//!
//! Every step that can answer the request early returns a
//! [`ResizeOutcome`] naming where the resulting file lives.

use super::backend::{ImageBackend, ImagingError};
use super::calculations::resolve;
use super::encoder::RasterEncoder;
use super::params::{ImportantPart, OutputFormat, ResizeMode, ResizeRequest, ResizeResult, Zoom};
use super::rust_backend::check_extension;
use crate::cache;
use crate::config::ImagingConfig;
use crate::types::Dimensions;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, ImagingError>;

/// What the caller asks for, before the source size is known.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResizeJob {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub mode: ResizeMode,
    pub zoom: Zoom,
    pub important_part: Option<ImportantPart>,
    /// Copy the result here in addition to the cache directory.
    pub target: Option<PathBuf>,
    /// Rewrite `target` even when it is newer than the source.
    pub force: bool,
}

impl ResizeJob {
    pub fn request(&self, source: Dimensions) -> ResizeRequest {
        ResizeRequest {
            source,
            target_width: self.width,
            target_height: self.height,
            mode: self.mode,
            zoom: self.zoom,
            important_part: self.important_part,
        }
    }
}

/// Where the result of a resize can be found, and how it got there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResizeOutcome {
    /// No resize was needed; the path is the source or its copy.
    Unchanged(PathBuf),
    /// A previous result was reused.
    Cached(PathBuf),
    /// An interceptor produced the file.
    Intercepted(PathBuf),
    /// The image was resized and written.
    Written(PathBuf),
}

impl ResizeOutcome {
    pub fn path(&self) -> &Path {
        match self {
            Self::Unchanged(p) | Self::Cached(p) | Self::Intercepted(p) | Self::Written(p) => p,
        }
    }
}

/// Hook consulted after the cache lookup and before any pixel work.
///
/// Returning `Some(path)` short-circuits the resize; that path is reported
/// as [`ResizeOutcome::Intercepted`].
pub trait ResizeInterceptor: Sync {
    fn intercept(
        &self,
        source: &Path,
        request: &ResizeRequest,
        cache_path: &Path,
        target: Option<&Path>,
    ) -> Option<PathBuf>;
}

/// Get image dimensions after checking the extension whitelist.
pub fn get_dimensions(backend: &impl ImageBackend, path: &Path) -> Result<Dimensions> {
    check_extension(path)?;
    backend.identify(path)
}

/// Reject sources, requested targets or resolved canvases beyond the
/// configured limits.
///
/// A single given side bounds only that side; the derived one comes from
/// the aspect ratio and is checked on `result`.
pub fn check_limits(
    request: &ResizeRequest,
    result: &ResizeResult,
    config: &ImagingConfig,
) -> Result<()> {
    let limits = &config.limits;
    let too_large = |width, height| ImagingError::DimensionTooLarge {
        width,
        height,
        max_width: limits.max_width,
        max_height: limits.max_height,
    };

    if request.source.width > limits.max_width || request.source.height > limits.max_height {
        return Err(too_large(request.source.width, request.source.height));
    }
    let (w, h) = (request.width().unwrap_or(0), request.height().unwrap_or(0));
    if w > limits.max_width || h > limits.max_height {
        return Err(too_large(w, h));
    }
    if result.canvas_width > limits.max_width || result.canvas_height > limits.max_height {
        return Err(too_large(result.canvas_width, result.canvas_height));
    }
    Ok(())
}

/// Resize `source` according to `job`, using the cache and limits from `config`.
pub fn resize_image(
    backend: &impl ImageBackend,
    source: &Path,
    job: &ResizeJob,
    config: &ImagingConfig,
    interceptor: Option<&dyn ResizeInterceptor>,
) -> Result<ResizeOutcome> {
    let extension = check_extension(source)?;
    let format = OutputFormat::from_extension(&extension)
        .ok_or_else(|| ImagingError::UnsupportedFormat(extension.clone()))?;

    let dims = get_dimensions(backend, source)?;
    let request = job.request(dims);
    let source_mtime = cache::mtime(source)?;

    if request.is_noop() || (request.width().is_none() && request.height().is_none()) {
        info!(source = %source.display(), "no resize required");
        return unchanged(source, job.target.as_deref(), source_mtime);
    }

    request.validate()?;

    let encoder = RasterEncoder::new(config.jpeg_quality());
    let effective = encoder.effective_format(format);
    let out_ext = if effective == format {
        extension.as_str()
    } else {
        effective.extension()
    };
    let key = cache::cache_key(source, &request, source_mtime);
    let cache_path = cache::cache_path(&config.output.cache_dir, source, &key, out_ext);

    if !config.output.debug {
        if let Some(target) = job.target.as_deref()
            && !job.force
            && cache::is_fresh(target, source_mtime)
        {
            info!(target = %target.display(), "target is up to date");
            return Ok(ResizeOutcome::Cached(target.to_path_buf()));
        }
        if cache_path.exists() {
            info!(cache = %cache_path.display(), "cache hit");
            return match job.target.as_deref() {
                Some(target) => {
                    cache::copy_to(&cache_path, target)?;
                    Ok(ResizeOutcome::Cached(target.to_path_buf()))
                }
                None => Ok(ResizeOutcome::Cached(cache_path)),
            };
        }
    }

    if let Some(hook) = interceptor
        && let Some(path) = hook.intercept(source, &request, &cache_path, job.target.as_deref())
    {
        info!(path = %path.display(), "resize intercepted");
        return Ok(ResizeOutcome::Intercepted(path));
    }

    let result = resolve(&request);
    debug!(?request, ?result, "resolved geometry");
    if let Err(e) = check_limits(&request, &result, config) {
        warn!(source = %source.display(), "{e}");
        return Err(e);
    }

    let bytes = {
        let raster = backend.decode(source)?;
        let resampled = backend.resample(&raster, &result);
        encoder.encode(&resampled, format)?
    };

    if let Some(parent) = cache_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&cache_path, &bytes)?;
    debug!(cache = %cache_path.display(), bytes = bytes.len(), "written");

    match job.target.as_deref() {
        Some(target) => {
            cache::copy_to(&cache_path, target)?;
            Ok(ResizeOutcome::Written(target.to_path_buf()))
        }
        None => Ok(ResizeOutcome::Written(cache_path)),
    }
}

/// Return the source as-is, copying it to `target` when that is missing or stale.
fn unchanged(source: &Path, target: Option<&Path>, source_mtime: u64) -> Result<ResizeOutcome> {
    match target {
        Some(target) => {
            if !cache::is_fresh(target, source_mtime) {
                cache::copy_to(source, target)?;
            }
            Ok(ResizeOutcome::Unchanged(target.to_path_buf()))
        }
        None => Ok(ResizeOutcome::Unchanged(source.to_path_buf())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use crate::test_helpers::write_png;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    fn config_in(dir: &Path) -> ImagingConfig {
        let mut config = ImagingConfig::default();
        config.output.cache_dir = dir.join("cache");
        config
    }

    fn job(width: u32, height: u32) -> ResizeJob {
        ResizeJob {
            width: Some(width),
            height: Some(height),
            ..ResizeJob::default()
        }
    }

    /// Source file on disk (its contents are irrelevant to the mock).
    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, b"x").unwrap();
        path
    }

    fn resample_count(backend: &MockBackend) -> usize {
        backend
            .get_operations()
            .iter()
            .filter(|op| matches!(op, RecordedOp::Resample { .. }))
            .count()
    }

    struct FixedInterceptor {
        calls: AtomicUsize,
        answer: Option<PathBuf>,
    }

    impl ResizeInterceptor for FixedInterceptor {
        fn intercept(
            &self,
            _source: &Path,
            _request: &ResizeRequest,
            _cache_path: &Path,
            _target: Option<&Path>,
        ) -> Option<PathBuf> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer.clone()
        }
    }

    #[test]
    fn unsupported_extension_is_rejected_before_identify() {
        let tmp = TempDir::new().unwrap();
        let source = touch(tmp.path(), "a.bmp");
        let backend = MockBackend::with_dimensions(vec![Dimensions::new(10, 10)]);

        let result = resize_image(&backend, &source, &job(5, 5), &config_in(tmp.path()), None);
        assert!(matches!(result, Err(ImagingError::UnsupportedFormat(_))));
        assert!(backend.get_operations().is_empty());
    }

    #[test]
    fn same_size_returns_source_unchanged() {
        let tmp = TempDir::new().unwrap();
        let source = touch(tmp.path(), "a.png");
        let backend = MockBackend::with_dimensions(vec![Dimensions::new(80, 60)]);

        let outcome =
            resize_image(&backend, &source, &job(80, 60), &config_in(tmp.path()), None).unwrap();
        assert_eq!(outcome, ResizeOutcome::Unchanged(source));
        assert_eq!(resample_count(&backend), 0);
    }

    #[test]
    fn unchanged_source_is_copied_to_target() {
        let tmp = TempDir::new().unwrap();
        let source = touch(tmp.path(), "a.png");
        let target = tmp.path().join("out/copy.png");
        let backend = MockBackend::with_dimensions(vec![Dimensions::new(80, 60)]);
        let job = ResizeJob {
            target: Some(target.clone()),
            ..ResizeJob::default()
        };

        let outcome = resize_image(&backend, &source, &job, &config_in(tmp.path()), None).unwrap();
        assert_eq!(outcome, ResizeOutcome::Unchanged(target.clone()));
        assert!(target.exists());
    }

    #[test]
    fn resize_writes_sharded_cache_file() {
        let tmp = TempDir::new().unwrap();
        let source = touch(tmp.path(), "photo.png");
        let backend = MockBackend::with_dimensions(vec![Dimensions::new(800, 600)]);
        let config = config_in(tmp.path());

        let outcome = resize_image(&backend, &source, &job(400, 400), &config, None).unwrap();
        let ResizeOutcome::Written(path) = outcome else {
            panic!("expected a written file, got {outcome:?}");
        };
        assert!(path.starts_with(&config.output.cache_dir));
        assert!(path.exists());
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("photo-") && name.ends_with(".png"), "{name}");

        let ops = backend.get_operations();
        assert!(ops.iter().any(|op| matches!(
            op,
            RecordedOp::Resample { result, .. }
                if result.canvas_width == 400 && result.canvas_height == 400
        )));
    }

    #[test]
    fn second_run_hits_cache() {
        let tmp = TempDir::new().unwrap();
        let source = touch(tmp.path(), "photo.png");
        let backend = MockBackend::with_dimensions(vec![Dimensions::new(800, 600)]);
        let config = config_in(tmp.path());

        let first = resize_image(&backend, &source, &job(200, 100), &config, None).unwrap();
        let second = resize_image(&backend, &source, &job(200, 100), &config, None).unwrap();
        assert_eq!(second, ResizeOutcome::Cached(first.path().to_path_buf()));
        assert_eq!(resample_count(&backend), 1);
    }

    #[test]
    fn debug_mode_bypasses_cache() {
        let tmp = TempDir::new().unwrap();
        let source = touch(tmp.path(), "photo.png");
        let backend = MockBackend::with_dimensions(vec![Dimensions::new(800, 600)]);
        let mut config = config_in(tmp.path());
        config.output.debug = true;

        resize_image(&backend, &source, &job(200, 100), &config, None).unwrap();
        let second = resize_image(&backend, &source, &job(200, 100), &config, None).unwrap();
        assert!(matches!(second, ResizeOutcome::Written(_)));
        assert_eq!(resample_count(&backend), 2);
    }

    #[test]
    fn fresh_target_is_reused_unless_forced() {
        let tmp = TempDir::new().unwrap();
        let source = touch(tmp.path(), "photo.png");
        let target = touch(tmp.path(), "target.png");
        let backend = MockBackend::with_dimensions(vec![Dimensions::new(800, 600)]);
        let config = config_in(tmp.path());

        let mut job = job(100, 100);
        job.target = Some(target.clone());
        let outcome = resize_image(&backend, &source, &job, &config, None).unwrap();
        assert_eq!(outcome, ResizeOutcome::Cached(target.clone()));

        job.force = true;
        let outcome = resize_image(&backend, &source, &job, &config, None).unwrap();
        assert_eq!(outcome, ResizeOutcome::Written(target));
    }

    #[test]
    fn interceptor_short_circuits() {
        let tmp = TempDir::new().unwrap();
        let source = touch(tmp.path(), "photo.jpg");
        let backend = MockBackend::with_dimensions(vec![Dimensions::new(800, 600)]);
        let hook = FixedInterceptor {
            calls: AtomicUsize::new(0),
            answer: Some(PathBuf::from("elsewhere.jpg")),
        };

        let outcome =
            resize_image(&backend, &source, &job(10, 10), &config_in(tmp.path()), Some(&hook))
                .unwrap();
        assert_eq!(outcome, ResizeOutcome::Intercepted(PathBuf::from("elsewhere.jpg")));
        assert_eq!(hook.calls.load(Ordering::SeqCst), 1);
        assert_eq!(resample_count(&backend), 0);
    }

    #[test]
    fn declining_interceptor_continues() {
        let tmp = TempDir::new().unwrap();
        let source = touch(tmp.path(), "photo.jpg");
        let backend = MockBackend::with_dimensions(vec![Dimensions::new(800, 600)]);
        let hook = FixedInterceptor {
            calls: AtomicUsize::new(0),
            answer: None,
        };

        let outcome =
            resize_image(&backend, &source, &job(10, 10), &config_in(tmp.path()), Some(&hook))
                .unwrap();
        assert!(matches!(outcome, ResizeOutcome::Written(_)));
    }

    #[test]
    fn oversized_source_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let source = touch(tmp.path(), "huge.png");
        let backend = MockBackend::with_dimensions(vec![Dimensions::new(5000, 100)]);

        let result = resize_image(&backend, &source, &job(100, 100), &config_in(tmp.path()), None);
        assert!(matches!(
            result,
            Err(ImagingError::DimensionTooLarge { width: 5000, .. })
        ));
        assert_eq!(resample_count(&backend), 0);
    }

    #[test]
    fn oversized_target_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let source = touch(tmp.path(), "a.png");
        let backend = MockBackend::with_dimensions(vec![Dimensions::new(100, 100)]);

        let result = resize_image(&backend, &source, &job(100, 4000), &config_in(tmp.path()), None);
        assert!(matches!(
            result,
            Err(ImagingError::DimensionTooLarge { height: 4000, .. })
        ));
    }

    #[test]
    fn derived_side_beyond_limits_is_rejected_before_decode() {
        let tmp = TempDir::new().unwrap();
        let source = touch(tmp.path(), "thin.png");
        let backend = MockBackend::with_dimensions(vec![Dimensions::new(2, 3000)]);
        let job = ResizeJob {
            width: Some(3000),
            ..ResizeJob::default()
        };

        let result = resize_image(&backend, &source, &job, &config_in(tmp.path()), None);
        assert!(matches!(
            result,
            Err(ImagingError::DimensionTooLarge {
                width: 3000,
                height: 4_500_000,
                ..
            })
        ));
        assert!(
            !backend
                .get_operations()
                .iter()
                .any(|op| matches!(op, RecordedOp::Decode(_)))
        );
    }

    #[test]
    fn check_limits_covers_resolved_canvas() {
        let config = ImagingConfig::default();
        let request = ResizeRequest::new(Dimensions::new(3000, 2)).with_target(None, Some(3000));
        let result = resolve(&request);
        assert_eq!(result.canvas_width, 4_500_000);
        assert!(check_limits(&request, &result, &config).is_err());

        let request = ResizeRequest::new(Dimensions::new(800, 600)).with_target(Some(400), None);
        assert!(check_limits(&request, &resolve(&request), &config).is_ok());
    }

    #[test]
    fn degenerate_important_part_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let source = touch(tmp.path(), "a.png");
        let backend = MockBackend::with_dimensions(vec![Dimensions::new(100, 100)]);
        let job = ResizeJob {
            zoom: Zoom::FULL,
            important_part: Some(ImportantPart::new(90, 90, 20, 20)),
            ..job(50, 50)
        };

        let result = resize_image(&backend, &source, &job, &config_in(tmp.path()), None);
        assert!(matches!(result, Err(ImagingError::DegenerateGeometry(_))));
    }

    #[test]
    fn decode_failure_is_reported() {
        let tmp = TempDir::new().unwrap();
        let source = touch(tmp.path(), "a.png");
        let backend = MockBackend::failing_decode(vec![Dimensions::new(100, 100)]);

        let result = resize_image(&backend, &source, &job(50, 50), &config_in(tmp.path()), None);
        assert!(matches!(result, Err(ImagingError::DecodeFailure(_))));
    }

    #[cfg(not(feature = "gif"))]
    #[test]
    fn gif_source_without_encoder_caches_as_png() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("a.gif");
        crate::test_helpers::quadrant_raster(10, 10)
            .as_image()
            .save(&source)
            .unwrap();
        let backend = crate::imaging::RustBackend::new();

        let outcome =
            resize_image(&backend, &source, &job(5, 5), &config_in(tmp.path()), None).unwrap();
        let ResizeOutcome::Written(path) = outcome else {
            panic!("expected a written file, got {outcome:?}");
        };
        assert_eq!(path.extension().unwrap(), "png");
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
        let written = image::load_from_memory(&bytes).unwrap();
        assert_eq!((written.width(), written.height()), (5, 5));
    }

    #[test]
    fn gif_source_is_accepted_by_extension_check() {
        let tmp = TempDir::new().unwrap();
        let source = touch(tmp.path(), "anim.gif");
        let backend = MockBackend::with_dimensions(vec![Dimensions::new(40, 40)]);

        let outcome =
            resize_image(&backend, &source, &job(20, 20), &config_in(tmp.path()), None).unwrap();
        let expected = if cfg!(feature = "gif") { "gif" } else { "png" };
        assert_eq!(outcome.path().extension().unwrap(), expected);
    }

    #[test]
    fn real_backend_end_to_end() {
        let tmp = TempDir::new().unwrap();
        let source = write_png(tmp.path(), "real.png", 120, 80);
        let backend = crate::imaging::RustBackend::new();
        let job = ResizeJob {
            zoom: Zoom::from_percent(50),
            important_part: Some(ImportantPart::new(10, 10, 40, 40)),
            ..job(60, 60)
        };

        let outcome = resize_image(&backend, &source, &job, &config_in(tmp.path()), None).unwrap();
        let written = image::open(outcome.path()).unwrap();
        assert_eq!((written.width(), written.height()), (60, 60));
    }
}
