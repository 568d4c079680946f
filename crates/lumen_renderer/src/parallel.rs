//! Row-partitioned multi-threaded rendering.
//!
//! The image is cut into contiguous row ranges, one per worker thread. Each
//! worker renders its rows into a private buffer; the orchestrating thread
//! only watches the shared [`Progress`] counter and stitches the buffers
//! back together in range order once every worker has been joined.

use std::ops::Range;
use std::thread;

use crate::renderer::render_rows;
use crate::{
    render_buckets, Camera, Hittable, ImageBuffer, Progress, ProgressMonitor, RenderConfig,
    RenderError, RenderResult, Rgb, StartLatch,
};

/// How work is divided between threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scheduler {
    /// One contiguous band of rows per std thread.
    #[default]
    Rows,
    /// Square tiles in spiral order on a rayon pool.
    Buckets,
}

/// Split `height` rows into `workers` contiguous ranges.
///
/// The first `height % workers` ranges get one extra row. A worker count of
/// zero is treated as one.
pub fn partition_rows(height: u32, workers: usize) -> Vec<Range<u32>> {
    let workers = u32::try_from(workers.max(1)).unwrap_or(u32::MAX);
    let base = height / workers;
    let extra = height % workers;

    let mut start = 0;
    (0..workers)
        .map(|i| {
            let len = base + u32::from(i < extra);
            let rows = start..start + len;
            start += len;
            rows
        })
        .collect()
}

/// Render with the chosen scheduler.
pub fn render_with(
    scheduler: Scheduler,
    camera: &Camera,
    world: &dyn Hittable,
    config: &RenderConfig,
    monitor: &mut dyn ProgressMonitor,
) -> RenderResult<ImageBuffer> {
    match scheduler {
        Scheduler::Rows => render_parallel(camera, world, config, monitor),
        Scheduler::Buckets => render_buckets(camera, world, config, monitor),
    }
}

/// Render on `config.worker_count()` threads, one row range each.
pub fn render_parallel(
    camera: &Camera,
    world: &dyn Hittable,
    config: &RenderConfig,
    monitor: &mut dyn ProgressMonitor,
) -> RenderResult<ImageBuffer> {
    let ranges = partition_rows(config.image_height, config.worker_count());
    let progress = Progress::new(config.image_height as usize);
    let latch = StartLatch::new(ranges.len());

    log::info!(
        "Rendering {}x{} at {} spp on {} threads",
        config.image_width,
        config.image_height,
        config.samples_per_pixel,
        ranges.len()
    );

    let result = thread::scope(|scope| -> RenderResult<Vec<Vec<Rgb>>> {
        let mut handles = Vec::with_capacity(ranges.len());

        for (worker, rows) in ranges.iter().cloned().enumerate() {
            let (progress, latch) = (&progress, &latch);
            let spawned = thread::Builder::new()
                .name(format!("lumen-render-{worker}"))
                .spawn_scoped(scope, move || {
                    latch.count_down();
                    log::debug!("Worker {worker} rendering rows {rows:?}");
                    let mut rng = rand::thread_rng();
                    render_rows(camera, world, config, rows, progress, &mut rng)
                });

            match spawned {
                Ok(handle) => handles.push(handle),
                Err(source) => {
                    log::error!("Failed to spawn render worker {worker}: {source}");
                    // Drain what already started so the scope does not re-raise
                    for handle in handles {
                        let _ = handle.join();
                    }
                    return Err(RenderError::Spawn { worker, source });
                }
            }
        }

        latch.wait();
        log::debug!("All {} workers started", handles.len());

        loop {
            let remaining = progress.remaining();
            monitor.update(remaining, progress.total());
            if remaining == 0 || handles.iter().all(|handle| handle.is_finished()) {
                break;
            }
            thread::sleep(config.progress_interval);
        }

        let mut buffers = Vec::with_capacity(handles.len());
        let mut failure = None;
        for (worker, handle) in handles.into_iter().enumerate() {
            match handle.join() {
                Ok(pixels) => buffers.push(pixels),
                Err(_) => {
                    log::error!("Render worker {worker} panicked");
                    failure.get_or_insert(RenderError::WorkerPanicked { worker });
                }
            }
        }

        match failure {
            Some(err) => Err(err),
            None => Ok(buffers),
        }
    });
    monitor.finish();

    let pixels = result?.concat();
    Ok(ImageBuffer {
        width: config.image_width,
        height: config.image_height,
        pixels,
    })
}
