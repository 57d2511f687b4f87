#[allow(dead_code)]
mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use common::{gradient, WAIT};
use imgcompare_core::geometry::{Pan, Size, ViewParams};
use imgcompare_core::operation::{MatchState, OperationKind, Side};
use imgcompare_core::scheduler::{execute, Job, OperationScheduler, Outcome};
use imgcompare_core::surface::ImageSurface;

fn params(zoom: f64) -> ViewParams {
    ViewParams {
        zoom,
        pan: Pan::ZERO,
        viewport: Size::new(200, 200),
    }
}

fn loaded(width: u32, height: u32) -> ImageSurface {
    ImageSurface::with_source(Some(Arc::new(gradient(width, height))))
}

fn geometry(outcome: Outcome) -> (ImageSurface, ImageSurface) {
    match outcome {
        Outcome::Geometry { left, right } => (left, right),
        other => panic!("expected geometry, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// execute
// ---------------------------------------------------------------------------

#[test]
fn test_execute_scale_one_side() {
    let job = Job {
        generation: 1,
        kind: OperationKind::ScaleOneSide(Side::Left),
        params: params(0.5),
        left: loaded(100, 80),
        right: ImageSurface::new(),
    };
    let (left, right) = geometry(execute(job, &|| false).unwrap());
    assert_eq!(left.scaled_size(), Size::new(50, 40));
    // The empty side still gets viewport-filling rects.
    assert_eq!(right.target_rect().size(), Size::new(200, 200));
}

#[test]
fn test_execute_compare() {
    let mut left = loaded(30, 30);
    let mut right = loaded(30, 30);
    left.rescale(&params(1.0));
    right.rescale(&params(1.0));
    let job = Job {
        generation: 1,
        kind: OperationKind::CompareOnly,
        params: params(1.0),
        left,
        right,
    };
    assert!(matches!(
        execute(job, &|| false),
        Some(Outcome::Compared(MatchState::Match))
    ));
}

#[test]
fn test_execute_abandons_when_cancelled() {
    let job = Job {
        generation: 1,
        kind: OperationKind::ScaleBothSides,
        params: params(2.0),
        left: loaded(10, 10),
        right: loaded(10, 10),
    };
    assert!(execute(job, &|| true).is_none());
}

// ---------------------------------------------------------------------------
// OperationScheduler
// ---------------------------------------------------------------------------

#[test]
fn test_dispatch_completes_on_worker() {
    let mut scheduler = OperationScheduler::new();
    assert!(!scheduler.is_worker_running());

    let generation = scheduler
        .dispatch(
            OperationKind::ScaleBothSides,
            params(2.0),
            loaded(20, 10),
            loaded(20, 10),
        )
        .unwrap();
    assert!(scheduler.is_worker_running());

    let completion = scheduler.wait_completion(WAIT).unwrap();
    assert_eq!(completion.generation, generation);
    let (left, right) = geometry(completion.outcome);
    assert_eq!(left.scaled_size(), Size::new(40, 20));
    assert_eq!(right.scaled_size(), Size::new(40, 20));
    assert!(scheduler.outstanding().is_none());
}

#[test]
fn test_latest_dispatch_wins() {
    let mut scheduler = OperationScheduler::new();
    scheduler
        .dispatch(
            OperationKind::ScaleBothSides,
            params(0.5),
            loaded(400, 400),
            loaded(400, 400),
        )
        .unwrap();
    let latest = scheduler
        .dispatch(
            OperationKind::ScaleBothSides,
            params(1.0),
            loaded(400, 400),
            loaded(400, 400),
        )
        .unwrap();

    let completion = scheduler.wait_completion(WAIT).unwrap();
    assert_eq!(completion.generation, latest);
    let (left, _) = geometry(completion.outcome);
    assert_eq!(left.scaled_size(), Size::new(400, 400));

    // Nothing else may surface afterwards.
    std::thread::sleep(Duration::from_millis(50));
    assert!(scheduler.try_completion().is_none());
}

#[test]
fn test_cancel_drops_completion() {
    let mut scheduler = OperationScheduler::new();
    scheduler
        .dispatch(
            OperationKind::UpdateRectsOnly,
            params(1.0),
            loaded(10, 10),
            loaded(10, 10),
        )
        .unwrap();
    scheduler.cancel();

    assert!(scheduler.outstanding().is_none());
    assert!(scheduler.wait_completion(Duration::from_millis(100)).is_none());
}

#[test]
fn test_generation_increases() {
    let mut scheduler = OperationScheduler::new();
    let a = scheduler
        .dispatch(OperationKind::NoOp, params(1.0), ImageSurface::new(), ImageSurface::new())
        .unwrap();
    let b = scheduler
        .dispatch(OperationKind::NoOp, params(1.0), ImageSurface::new(), ImageSurface::new())
        .unwrap();
    assert!(b > a);
    assert_eq!(scheduler.generation(), b);
}

#[test]
fn test_worker_restarts_after_shutdown() {
    let mut scheduler = OperationScheduler::new();
    scheduler
        .dispatch(OperationKind::NoOp, params(1.0), ImageSurface::new(), ImageSurface::new())
        .unwrap();
    scheduler.wait_completion(WAIT).unwrap();

    scheduler.shutdown();
    assert!(!scheduler.is_worker_running());

    scheduler
        .dispatch(OperationKind::NoOp, params(1.0), ImageSurface::new(), ImageSurface::new())
        .unwrap();
    let completion = scheduler.wait_completion(WAIT).unwrap();
    assert!(matches!(completion.outcome, Outcome::Nothing));
}

#[test]
fn test_wake_runs_after_completion() {
    let woken = Arc::new(AtomicUsize::new(0));
    let mut scheduler = OperationScheduler::new();
    let counter = Arc::clone(&woken);
    scheduler.set_wake(Arc::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    }));

    scheduler
        .dispatch(OperationKind::NoOp, params(1.0), ImageSurface::new(), ImageSurface::new())
        .unwrap();
    scheduler.wait_completion(WAIT).unwrap();

    let deadline = Instant::now() + WAIT;
    while woken.load(Ordering::SeqCst) == 0 && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(woken.load(Ordering::SeqCst), 1);
}
