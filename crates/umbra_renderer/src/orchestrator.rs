//! Progressive multi-pass rendering across a pool of backends.
//!
//! Four roles cooperate over channels:
//!
//! - a producer queues one job per requested pass
//! - a dispatcher pairs each job with an idle renderer and runs it on a
//!   worker thread
//! - workers hand rasters to the merger, or requeue the job after a delay
//!   when their renderer fails
//! - the merger accumulates passes and publishes a snapshot after each one
//!
//! The caller sees the snapshots as an iterator of `Frame`s.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, SyncSender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use umbra_core::{CoreError, Raster, Scene};

use crate::error::RenderResult;
use crate::render::render_pass;

/// Default pause before a failed pass is retried.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// A backend able to render one pass of a scene.
pub trait Renderer: Send + Sync {
    fn render(&self, scene: &Scene) -> RenderResult<Raster>;

    /// Short label for log messages.
    fn describe(&self) -> String {
        "renderer".to_string()
    }
}

/// Renders on this machine's cores.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalRenderer;

impl Renderer for LocalRenderer {
    fn render(&self, scene: &Scene) -> RenderResult<Raster> {
        render_pass(scene)
    }

    fn describe(&self) -> String {
        "local".to_string()
    }
}

/// Snapshot of the accumulated raster after a pass.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Passes merged so far (1-based)
    pub pass: u32,
    /// Passes requested (0 = unbounded)
    pub passes: u32,
    pub raster: Raster,
}

/// Stream of frames from a running render.
///
/// Dropping it stops an unbounded render after the passes in flight.
pub struct Frames {
    receiver: Receiver<Frame>,
    merger: JoinHandle<()>,
}

impl Frames {
    /// Stop consuming and wait until every render thread has exited.
    pub fn stop(self) {
        let Frames { receiver, merger } = self;
        drop(receiver);
        if merger.join().is_err() {
            log::error!("Merger thread panicked");
        }
    }
}

impl Iterator for Frames {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        self.receiver.recv().ok()
    }
}

enum Job {
    Pass(u32),
    Stop,
}

/// Distributes passes over a set of renderers.
pub struct Orchestrator {
    renderers: Vec<Arc<dyn Renderer>>,
    retry_delay: Duration,
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Orchestrator {
    /// Use the given renderers, or a single `LocalRenderer` when empty.
    pub fn new(renderers: Vec<Arc<dyn Renderer>>) -> Self {
        let renderers = if renderers.is_empty() {
            vec![Arc::new(LocalRenderer) as Arc<dyn Renderer>]
        } else {
            renderers
        };
        Self {
            renderers,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    /// Set the pause before a failed pass is retried.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn renderer_count(&self) -> usize {
        self.renderers.len()
    }

    /// Start rendering `scene` and return its frames.
    ///
    /// Renders `settings.passes` passes, or keeps going until the frames
    /// are dropped when that is 0.
    pub fn render(&self, scene: &Scene) -> Frames {
        let passes = scene.settings.passes;
        let pool = self.renderers.len();

        // Workers never need the accumulated raster
        let mut request = scene.clone();
        request.raster = Raster::default();
        let request = Arc::new(request);

        let (job_tx, job_rx) = mpsc::sync_channel::<Job>(pool * 2);
        let (ready_tx, ready_rx) = mpsc::channel::<Arc<dyn Renderer>>();
        let (raster_tx, raster_rx) = mpsc::channel::<Raster>();
        let (frame_tx, frame_rx) = mpsc::sync_channel::<Frame>(1);
        let stopping = Arc::new(AtomicBool::new(false));

        for renderer in &self.renderers {
            // The receiver is alive until the dispatcher starts
            let _ = ready_tx.send(Arc::clone(renderer));
        }

        let producer = {
            let job_tx = job_tx.clone();
            let stopping = Arc::clone(&stopping);
            thread::spawn(move || produce(job_tx, passes, &stopping))
        };

        let dispatcher = {
            let context = WorkerContext {
                scene: request,
                job_tx: job_tx.clone(),
                ready_tx,
                raster_tx,
                retry_delay: self.retry_delay,
            };
            let stopping = Arc::clone(&stopping);
            thread::spawn(move || dispatch(job_rx, ready_rx, context, &stopping))
        };

        let blank = scene.blank_raster();
        let merger = thread::spawn(move || {
            merge(blank, passes, raster_rx, frame_tx);

            stopping.store(true, Ordering::SeqCst);
            let _ = job_tx.send(Job::Stop);
            drop(job_tx);

            if dispatcher.join().is_err() {
                log::error!("Dispatcher thread panicked");
            }
            if producer.join().is_err() {
                log::error!("Producer thread panicked");
            }
        });

        Frames {
            receiver: frame_rx,
            merger,
        }
    }
}

/// Everything a worker thread needs to run one job.
#[derive(Clone)]
struct WorkerContext {
    scene: Arc<Scene>,
    job_tx: SyncSender<Job>,
    ready_tx: Sender<Arc<dyn Renderer>>,
    raster_tx: Sender<Raster>,
    retry_delay: Duration,
}

fn produce(job_tx: SyncSender<Job>, passes: u32, stopping: &AtomicBool) {
    let mut pass = 1;
    while passes == 0 || pass <= passes {
        if stopping.load(Ordering::SeqCst) || job_tx.send(Job::Pass(pass)).is_err() {
            break;
        }
        pass += 1;
    }
}

fn dispatch(
    job_rx: Receiver<Job>,
    ready_rx: Receiver<Arc<dyn Renderer>>,
    context: WorkerContext,
    stopping: &AtomicBool,
) {
    let mut workers = Vec::new();

    for job in job_rx.iter() {
        let pass = match job {
            Job::Pass(pass) => pass,
            Job::Stop => break,
        };
        if stopping.load(Ordering::SeqCst) {
            break;
        }

        let Ok(renderer) = ready_rx.recv() else {
            break;
        };
        if stopping.load(Ordering::SeqCst) {
            break;
        }

        workers.retain(|worker: &JoinHandle<()>| !worker.is_finished());
        let context = context.clone();
        workers.push(thread::spawn(move || run_job(pass, renderer, context)));
    }

    // Closing the queue releases a producer blocked on a full queue
    drop(job_rx);

    for worker in workers {
        if worker.join().is_err() {
            log::error!("Render worker panicked");
        }
    }
}

/// Give every pass its own seed so accumulated passes are not identical.
/// A zero seed already varies with the clock and is kept.
fn pass_scene(scene: &Scene, pass: u32) -> Scene {
    let mut scene = scene.clone();
    if scene.seed != 0 {
        scene.seed = scene
            .seed
            .wrapping_add(u64::from(pass).wrapping_mul(0x9E37_79B9_7F4A_7C15))
            .max(1);
    }
    scene
}

fn run_job(pass: u32, renderer: Arc<dyn Renderer>, context: WorkerContext) {
    let scene = pass_scene(&context.scene, pass);
    let settings = &scene.settings;
    let result = renderer.render(&scene).and_then(|raster| {
        if raster.width != settings.width || raster.height != settings.height {
            return Err(CoreError::RasterMismatch {
                expected: (settings.width, settings.height),
                actual: (raster.width, raster.height),
            }
            .into());
        }
        Ok(raster)
    });

    match result {
        Ok(raster) => {
            let _ = context.ready_tx.send(renderer);
            let _ = context.raster_tx.send(raster);
        }
        Err(err) => {
            log::warn!(
                "Renderer {} failed on pass {}: {}; retrying in {:?}",
                renderer.describe(),
                pass,
                err,
                context.retry_delay
            );
            thread::sleep(context.retry_delay);
            // Return the renderer before requeueing so the dispatcher can
            // always make progress
            let _ = context.ready_tx.send(renderer);
            let _ = context.job_tx.send(Job::Pass(pass));
        }
    }
}

fn merge(
    mut raster: Raster,
    passes: u32,
    raster_rx: Receiver<Raster>,
    frame_tx: SyncSender<Frame>,
) {
    let mut pass = 0;
    while passes == 0 || pass < passes {
        let Ok(next) = raster_rx.recv() else {
            break;
        };
        if let Err(err) = raster.merge(&next) {
            log::error!("Dropping pass: {}", err);
            continue;
        }

        pass += 1;
        log::info!("pass {} of {}", pass, passes);

        let frame = Frame {
            pass,
            passes,
            raster: raster.clone(),
        };
        if frame_tx.send(frame).is_err() {
            log::debug!("Frame receiver dropped after pass {}", pass);
            break;
        }
    }
}
