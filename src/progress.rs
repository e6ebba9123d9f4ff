/// Forwards completion percentages to an optional callback. Values never go
/// backwards and never exceed 100, whatever the caller passes in.
pub struct Progress<'a> {
    sink: Option<&'a mut dyn FnMut(u8)>,
    last: u8,
}

impl<'a> Progress<'a> {
    pub fn new(sink: Option<&'a mut dyn FnMut(u8)>) -> Self {
        Self { sink, last: 0 }
    }

    pub fn silent() -> Self {
        Self::new(None)
    }

    pub fn report(&mut self, percent: u8) {
        let percent = percent.min(100).max(self.last);
        self.last = percent;
        if let Some(sink) = self.sink.as_mut() {
            sink(percent);
        }
    }

    pub fn last(&self) -> u8 {
        self.last
    }
}
