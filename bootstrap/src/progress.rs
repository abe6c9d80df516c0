use shared::progress::ProgressBar;

pub struct TerminalProgressBar {
    bar: indicatif::ProgressBar,
}

impl TerminalProgressBar {
    pub fn new() -> Self {
        let bar = indicatif::ProgressBar::new(0);
        bar.set_style(
            indicatif::ProgressStyle::default_bar()
                .template("{msg} {bar:40.cyan/blue} {bytes}/{total_bytes}")
                .unwrap_or_else(|_| indicatif::ProgressStyle::default_bar()),
        );
        Self { bar }
    }
}

impl ProgressBar<String> for TerminalProgressBar {
    fn set_message(&self, message: String) {
        self.bar.set_message(message);
    }

    fn set_length(&self, length: u64) {
        self.bar.set_length(length);
    }

    fn inc(&self, amount: u64) {
        self.bar.inc(amount);
    }

    fn finish(&self) {
        self.bar.finish();
    }
}
