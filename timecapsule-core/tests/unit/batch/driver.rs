use super::*;
use crate::batch::cache::CachePolicy;

fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "timecapsule_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

fn write_solid(path: &Path, w: u32, h: u32, rgb: [u8; 3]) {
    let img = image::RgbImage::from_pixel(w, h, image::Rgb(rgb));
    img.save_with_format(path, image::ImageFormat::Png).unwrap();
}

fn config_in(root: &Path) -> CapsuleConfig {
    CapsuleConfig {
        screenshots_dir: root.join("shots"),
        masks_dir: root.join("masks"),
        glitches_dir: root.join("glitches"),
        ..CapsuleConfig::default()
    }
}

fn shots(root: &Path, colors: &[[u8; 3]]) -> Vec<PathBuf> {
    let dir = root.join("shots");
    std::fs::create_dir_all(&dir).unwrap();
    colors
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let p = dir.join(format!("2020010{}000000.png", i + 1));
            write_solid(&p, 20, 10, *c);
            p
        })
        .collect()
}

#[test]
fn process_pair_reports_decode_error_for_missing_input() {
    let root = temp_dir("driver_missing");
    let inputs = shots(&root, &[[0, 0, 0]]);
    let err = process_pair(
        &inputs[0],
        &root.join("nope.png"),
        15,
        &GlitchRecipe::default(),
    )
    .unwrap_err();
    assert!(matches!(err, CapsuleError::Decode { .. }));
    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn insufficient_input_is_a_reported_noop() {
    let root = temp_dir("driver_insufficient");
    let cfg = config_in(&root);
    let driver = BatchDriver::new(&cfg).unwrap();
    let inputs = shots(&root, &[[1, 2, 3]]);

    let report = driver.run(&inputs).unwrap();
    assert_eq!(report.status, BatchStatus::InsufficientInput { available: 1 });
    assert!(report.pairs.is_empty());
    assert!(!cfg.masks_dir.exists(), "no output dirs for a no-op batch");
    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn second_run_recomputes_nothing() {
    let root = temp_dir("driver_idempotent");
    let cfg = config_in(&root);
    let driver = BatchDriver::new(&cfg).unwrap();
    let inputs = shots(&root, &[[255, 0, 0], [0, 0, 255], [0, 0, 255]]);

    let first = driver.run(&inputs).unwrap();
    assert_eq!(first.status, BatchStatus::Completed);
    assert_eq!(first.written(), 2);

    let mask_before = std::fs::read(driver.layout().mask_path(&first.pairs[0].pair)).unwrap();
    let second = driver.run(&inputs).unwrap();
    assert_eq!(second.written(), 0);
    assert_eq!(second.cached(), 2);
    let mask_after = std::fs::read(driver.layout().mask_path(&first.pairs[0].pair)).unwrap();
    assert_eq!(mask_before, mask_after);

    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn failing_pair_does_not_abort_the_batch() {
    let root = temp_dir("driver_failure");
    let cfg = config_in(&root);
    let driver = BatchDriver::new(&cfg).unwrap();
    let mut inputs = shots(&root, &[[10, 10, 10], [200, 10, 10]]);
    let broken = root.join("shots").join("20200103000000.png");
    std::fs::write(&broken, b"not an image").unwrap();
    inputs.push(broken);

    let report = driver.run(&inputs).unwrap();
    assert_eq!(report.pairs.len(), 2);
    assert!(matches!(report.pairs[0].outcome, PairOutcome::Written { .. }));
    assert!(matches!(
        report.pairs[1].outcome,
        PairOutcome::Failed(CapsuleError::Decode { .. })
    ));
    let (pair, _) = report.failures().next().unwrap();
    assert_eq!(pair.artifact_name(), "20200102000000__20200103000000");
    assert!(!driver.layout().glitch_path(pair).exists());

    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn parallel_run_matches_sequential_run() {
    let colors = [[0, 0, 0], [90, 0, 0], [90, 90, 0], [90, 90, 90], [0, 0, 0]];

    let seq_root = temp_dir("driver_seq");
    let seq_driver = BatchDriver::new(&config_in(&seq_root)).unwrap();
    let seq = seq_driver.run(&shots(&seq_root, &colors)).unwrap();

    let par_root = temp_dir("driver_par");
    let mut par_cfg = config_in(&par_root);
    par_cfg.threading = BatchThreading {
        parallel: true,
        threads: Some(2),
    };
    let par_driver = BatchDriver::new(&par_cfg).unwrap();
    let par = par_driver.run(&shots(&par_root, &colors)).unwrap();

    assert_eq!(seq.written(), 4);
    assert_eq!(par.written(), 4);
    for (s, p) in seq.pairs.iter().zip(par.pairs.iter()) {
        assert_eq!(s.pair.index, p.pair.index);
        assert_eq!(
            std::fs::read(seq_driver.layout().glitch_path(&s.pair)).unwrap(),
            std::fs::read(par_driver.layout().glitch_path(&p.pair)).unwrap()
        );
    }

    std::fs::remove_dir_all(&seq_root).ok();
    std::fs::remove_dir_all(&par_root).ok();
}

#[test]
fn content_hash_policy_recomputes_after_input_edit() {
    let root = temp_dir("driver_content_hash");
    let mut cfg = config_in(&root);
    cfg.cache = CachePolicy::ContentHash;
    let driver = BatchDriver::new(&cfg).unwrap();
    let inputs = shots(&root, &[[0, 0, 0], [255, 255, 255]]);

    assert_eq!(driver.run(&inputs).unwrap().written(), 1);
    assert_eq!(driver.run(&inputs).unwrap().cached(), 1);

    write_solid(&inputs[1], 20, 10, [0, 0, 0]);
    let third = driver.run(&inputs).unwrap();
    assert_eq!(third.written(), 1);
    let mask = image::open(driver.layout().mask_path(&third.pairs[0].pair))
        .unwrap()
        .to_luma8();
    assert!(mask.pixels().all(|p| p.0[0] == 0));

    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn zero_threads_is_rejected() {
    assert!(build_thread_pool(Some(0)).is_err());
    assert!(build_thread_pool(Some(1)).is_ok());
}

#[test]
fn repeated_stems_do_not_reuse_earlier_artifacts() {
    let root = temp_dir("driver_collision");
    let cfg = config_in(&root);
    let driver = BatchDriver::new(&cfg).unwrap();
    let (d1, d2) = (root.join("d1"), root.join("d2"));
    std::fs::create_dir_all(&d1).unwrap();
    std::fs::create_dir_all(&d2).unwrap();
    let inputs = vec![
        d1.join("a.png"),
        d1.join("b.png"),
        d2.join("a.png"),
        d2.join("b.png"),
    ];
    write_solid(&inputs[0], 20, 10, [0, 0, 0]);
    write_solid(&inputs[1], 20, 10, [0, 0, 0]);
    write_solid(&inputs[2], 20, 10, [0, 0, 0]);
    write_solid(&inputs[3], 20, 10, [255, 255, 255]);

    let report = driver.run(&inputs).unwrap();
    assert_eq!(report.pairs.len(), 3);
    assert!(matches!(report.pairs[0].outcome, PairOutcome::Written { .. }));
    assert!(matches!(report.pairs[1].outcome, PairOutcome::Written { .. }));
    assert!(matches!(
        report.pairs[2].outcome,
        PairOutcome::Failed(CapsuleError::Validation(_))
    ));
    let (pair, err) = report.failures().next().unwrap();
    assert_eq!(pair.index, 2);
    assert!(err.to_string().contains("a__b"), "{err}");

    // The first a__b pair still owns the mask: black vs black, nothing changed.
    let mask = image::open(driver.layout().mask_path(&report.pairs[0].pair))
        .unwrap()
        .to_luma8();
    assert!(mask.pixels().all(|p| p.0[0] == 0));

    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn repeated_stems_fail_in_parallel_runs_too() {
    let root = temp_dir("driver_collision_par");
    let mut cfg = config_in(&root);
    cfg.threading = BatchThreading {
        parallel: true,
        threads: Some(2),
    };
    let driver = BatchDriver::new(&cfg).unwrap();
    std::fs::create_dir_all(&root).unwrap();
    let shot = root.join("same.png");
    write_solid(&shot, 20, 10, [9, 9, 9]);
    let inputs = vec![shot.clone(), shot.clone(), shot];

    let report = driver.run(&inputs).unwrap();
    assert_eq!(report.written(), 1);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.failures().next().unwrap().0.index, 1);

    std::fs::remove_dir_all(&root).ok();
}

#[derive(Clone, Default)]
struct LogBuffer(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

impl std::io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn failed_pair_is_logged_with_its_name() {
    let root = temp_dir("driver_failure_log");
    let cfg = config_in(&root);
    let driver = BatchDriver::new(&cfg).unwrap();
    let mut inputs = shots(&root, &[[10, 10, 10]]);
    inputs.push(root.join("shots").join("20200109000000.png"));

    let logs = LogBuffer::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .with_writer(move || writer.clone())
        .finish();
    let report = tracing::subscriber::with_default(subscriber, || driver.run(&inputs).unwrap());
    assert_eq!(report.failed(), 1);

    let text = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
    assert!(text.contains("WARN"), "{text}");
    assert!(text.contains("pair failed"), "{text}");
    assert!(text.contains("20200101000000 -> 20200109000000"), "{text}");

    std::fs::remove_dir_all(&root).ok();
}
