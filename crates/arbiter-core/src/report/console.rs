use crate::engine::runner::PassSummary;

pub fn print_summary(summary: &PassSummary) {
    for s in &summary.skipped {
        eprintln!("SKIP [{}]: {}", s.path.display(), s.reason);
    }
    eprintln!(
        "Pass complete: processed={} skipped={}",
        summary.processed,
        summary.skipped.len()
    );
}
