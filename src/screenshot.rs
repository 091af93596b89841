// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Screenshot capability for failed steps lacking an attached image.

/// Source of a screenshot of the system under test.
pub trait Screenshot {
    /// Captures a screenshot as a [`base64`] encoded PNG, if possible.
    fn capture(&mut self) -> Option<String>;
}

impl<F: FnMut() -> Option<String>> Screenshot for F {
    fn capture(&mut self) -> Option<String> {
        self()
    }
}

/// [`Screenshot`] capturing nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoScreenshot;

impl Screenshot for NoScreenshot {
    fn capture(&mut self) -> Option<String> {
        None
    }
}
