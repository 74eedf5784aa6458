//! Batch OCR over a pool of worker threads.
//!
//! Jobs go out over a std::sync::mpsc channel shared by the workers; each
//! result comes back tagged with its job index so the batch is reassembled
//! in input order regardless of completion order.

use image::GrayImage;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Mutex;
use std::thread;

use super::engine::TextRecognizer;

/// One badge image to read.
#[derive(Debug, Clone, Copy)]
pub struct OcrJob<'a> {
    /// Position in the batch
    pub index: usize,
    pub image: &'a GrayImage,
}

/// Creates a new work queue.
///
/// The channel is unbounded; the whole batch is queued before workers start.
pub fn create_work_queue<'a>() -> (Sender<OcrJob<'a>>, Receiver<OcrJob<'a>>) {
    channel()
}

/// Pulls jobs until the queue is drained. A failed job reports `None`.
fn run_ocr_worker(
    worker_id: usize,
    recognizer: &dyn TextRecognizer,
    jobs: &Mutex<Receiver<OcrJob<'_>>>,
    results: Sender<(usize, Option<String>)>,
) {
    loop {
        let job = match jobs.lock() {
            Ok(receiver) => receiver.recv(),
            Err(_) => break,
        };
        let Ok(job) = job else {
            break;
        };

        let text = match recognizer.recognize(job.image) {
            Ok(text) => Some(text),
            Err(e) => {
                crate::log(&format!(
                    "OCR worker {}: job {} failed: {}",
                    worker_id, job.index, e
                ));
                None
            }
        };

        if results.send((job.index, text)).is_err() {
            break;
        }
    }
}

/// Recognizes every image, using up to `workers` threads.
///
/// The output has one entry per input, in input order.
pub fn recognize_batch(
    recognizer: &dyn TextRecognizer,
    images: &[GrayImage],
    workers: usize,
) -> Vec<Option<String>> {
    let mut results: Vec<Option<String>> = vec![None; images.len()];
    if images.is_empty() {
        return results;
    }

    let (job_sender, job_receiver) = create_work_queue();
    for (index, image) in images.iter().enumerate() {
        // The receiver is held right here, so sending cannot fail
        let _ = job_sender.send(OcrJob { index, image });
    }
    drop(job_sender);

    let jobs = Mutex::new(job_receiver);
    let (result_sender, result_receiver) = channel();
    let worker_count = workers.clamp(1, images.len());

    thread::scope(|scope| {
        for worker_id in 0..worker_count {
            let results = result_sender.clone();
            let jobs = &jobs;
            scope.spawn(move || run_ocr_worker(worker_id, recognizer, jobs, results));
        }
    });
    drop(result_sender);

    for (index, text) in result_receiver {
        results[index] = text;
    }

    let failed = results.iter().filter(|r| r.is_none()).count();
    crate::log(&format!(
        "OCR batch: {} images, {} workers, {} failed",
        images.len(),
        worker_count,
        failed
    ));

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Result};
    use image::Luma;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Reads the top-left pixel as the text; pixel 0 is a failure.
    struct PixelRecognizer {
        calls: AtomicUsize,
    }

    impl TextRecognizer for PixelRecognizer {
        fn recognize(&self, img: &GrayImage) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match img.get_pixel(0, 0)[0] {
                0 => Err(anyhow!("unreadable")),
                v => Ok(format!("Lv.{}", v)),
            }
        }
    }

    fn badge(value: u8) -> GrayImage {
        GrayImage::from_pixel(4, 4, Luma([value]))
    }

    #[test]
    fn test_work_queue_send_receive() {
        let img = badge(1);
        let (sender, receiver) = create_work_queue();
        sender.send(OcrJob { index: 7, image: &img }).unwrap();
        drop(sender);

        assert_eq!(receiver.recv().unwrap().index, 7);
        assert!(receiver.recv().is_err());
    }

    #[test]
    fn test_batch_keeps_input_order() {
        let recognizer = PixelRecognizer {
            calls: AtomicUsize::new(0),
        };
        let images: Vec<GrayImage> = (1..=20).map(badge).collect();

        let results = recognize_batch(&recognizer, &images, 4);

        assert_eq!(results.len(), 20);
        for (i, text) in results.iter().enumerate() {
            assert_eq!(text.as_deref(), Some(format!("Lv.{}", i + 1).as_str()));
        }
        assert_eq!(recognizer.calls.load(Ordering::SeqCst), 20);
    }

    #[test]
    fn test_failed_job_yields_none() {
        let recognizer = PixelRecognizer {
            calls: AtomicUsize::new(0),
        };
        let images = vec![badge(5), badge(0), badge(9)];

        let results = recognize_batch(&recognizer, &images, 2);

        assert_eq!(
            results,
            vec![Some("Lv.5".to_string()), None, Some("Lv.9".to_string())]
        );
    }

    #[test]
    fn test_zero_workers_still_runs_one() {
        let recognizer = PixelRecognizer {
            calls: AtomicUsize::new(0),
        };
        let results = recognize_batch(&recognizer, &[badge(3)], 0);
        assert_eq!(results, vec![Some("Lv.3".to_string())]);
    }

    #[test]
    fn test_empty_batch() {
        let recognizer = PixelRecognizer {
            calls: AtomicUsize::new(0),
        };
        assert!(recognize_batch(&recognizer, &[], 4).is_empty());
        assert_eq!(recognizer.calls.load(Ordering::SeqCst), 0);
    }
}
