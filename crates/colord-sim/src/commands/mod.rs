pub mod orderings;
pub mod run;
pub mod status;
pub mod summarize;

use colord_exp::summary::MetricSummary;

/// Prints the best and worst strategy of every metric.
pub fn print_summary(summaries: &[MetricSummary]) {
    if summaries.is_empty() {
        println!("no metric values to summarize");
        return;
    }
    println!("ordering effects by metric:");
    for summary in summaries {
        println!("  {}", summary.metric);
        for mean in &summary.means {
            println!(
                "    {:<12} {:.4} (n={})",
                mean.strategy, mean.mean, mean.samples
            );
        }
        println!(
            "    best: {} ({:.4})  worst: {} ({:.4})  difference: {:.4}",
            summary.best.strategy,
            summary.best.mean,
            summary.worst.strategy,
            summary.worst.mean,
            summary.difference
        );
    }
}
