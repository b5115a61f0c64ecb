use sevlog::{ConfigBuilder, Severity};

fn main() {
    // SEVLOG_TAG, SEVLOG_LEVEL and SEVLOG_FILE override the defaults below.
    let builder = match ConfigBuilder::from_env() {
        Ok(builder) => builder,
        Err(err) => {
            eprintln!("Unable to open log file: {err}");
            std::process::exit(1);
        }
    };
    let _guard = builder.init_global();

    sevlog::info().append(" Information");
    sevlog::warning().append(" Warning");
    sevlog::debug().append(" Debug");
    sevlog::error().append(" Error");
    sevlog::critical().append(" Critical");

    let logger = sevlog::global().with_tag("worker");
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let logger = logger.clone();
            std::thread::spawn(move || {
                let _ = logger.record(Severity::ALL[i % 5]) << "hello from thread " << i;
            })
        })
        .collect();
    for handle in handles {
        handle.join().ok();
    }
    log::warn!("log macros end up in the same sink");
}
