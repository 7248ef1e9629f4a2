//! celebid - Celebi detection daemon
//!
//! This daemon:
//! 1. Connects the configured frame source (stub scene or physical camera)
//! 2. Polls the serial gateway for DETECT requests
//! 3. Resolves each request through the bounded retry loop
//! 4. Reports the resolution back over serial and fans out alerts
//! 5. Parks in a blocking audio alert on terminal outcomes until Ctrl-C

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use celebi_watch::{
    config::WatchConfig,
    counter::CounterStore,
    detect::{DetectionController, PatternMatcher, RetryPolicy},
    device,
    ingest,
    notify::{default_sink, AlertSink, AlertSound, NotificationDispatcher, SmsNotifier, Verdict},
};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cfg = WatchConfig::load()?;

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = running.clone();
        ctrlc::set_handler(move || {
            log::info!("shutdown requested");
            running.store(false, Ordering::SeqCst);
        })
        .context("install signal handler")?;
    }

    let mut source = ingest::open_source(&cfg.camera)?;
    source.connect()?;

    let matcher = PatternMatcher::from_file(&cfg.detection.pattern_path, cfg.detection.match_threshold)?;
    log::info!(
        "reference pattern {} ({}x{}), threshold {}",
        cfg.detection.pattern_path.display(),
        matcher.reference_size().0,
        matcher.reference_size().1,
        matcher.threshold()
    );

    let store = CounterStore::new(&cfg.counter_path);
    let mut controller = DetectionController::new(
        store,
        matcher,
        cfg.region,
        RetryPolicy {
            max_attempts: cfg.detection.max_attempts,
            settle: Duration::from_millis(cfg.detection.settle_ms),
        },
    );
    log::info!(
        "counter {} from {}",
        controller.counter(),
        cfg.counter_path.display()
    );

    let mut gateway = device::open_gateway(&cfg.serial);

    let dispatcher = NotificationDispatcher::new(SmsNotifier::from_env(&cfg.sms_host));
    let mut audio = default_sink();

    if cfg.serial.endpoint.is_empty() {
        log::info!(
            "celebid running: camera {:?}, serial {}/{}*",
            cfg.camera.endpoint,
            cfg.serial.dev_dir.display(),
            cfg.serial.prefix
        );
    } else {
        log::info!(
            "celebid running: camera {:?}, serial {:?}",
            cfg.camera.endpoint,
            cfg.serial.endpoint
        );
    }

    while running.load(Ordering::SeqCst) {
        let request = match gateway.poll_request() {
            Ok(Some(request)) => request,
            Ok(None) => {
                std::thread::sleep(Duration::from_millis(250));
                continue;
            }
            Err(e) => {
                let verdict = dispatcher.dispatch_failure(&e);
                handle_verdict(verdict, &cfg, &running, audio.as_mut());
                continue;
            }
        };

        let resolution = controller.resolve(&request, source.as_mut());
        let verdict = dispatcher.dispatch(&resolution, &mut gateway);
        handle_verdict(verdict, &cfg, &running, audio.as_mut());
    }

    log::info!("celebid shutting down");
    Ok(())
}

/// Terminal verdicts park here, replaying the alert sound until the
/// operator signals quit. `Continue` falls straight through.
fn handle_verdict(
    verdict: Verdict,
    cfg: &WatchConfig,
    running: &AtomicBool,
    audio: &mut dyn AlertSink,
) {
    let Verdict::Halt(sound) = verdict else {
        return;
    };
    let path = match sound {
        AlertSound::Bell => &cfg.audio.bell,
        AlertSound::Error => &cfg.audio.error,
    };
    log::warn!("terminal alert, looping {} until Ctrl-C", path.display());
    while running.load(Ordering::SeqCst) {
        if let Err(e) = audio.play(path) {
            log::error!("alert playback failed: {e:#}");
            std::thread::sleep(Duration::from_secs(1));
        }
    }
}
