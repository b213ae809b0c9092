pub mod console;

use ::crossterm::event::Event;
use std::io;
use std::time::Duration;

/// Source of terminal input events.
pub trait InputDriver {
    fn poll(&mut self, timeout: Duration) -> io::Result<bool>;
    fn read(&mut self) -> io::Result<Event>;
    fn set_mouse_capture(&mut self, _enabled: bool) -> io::Result<()> {
        Ok(())
    }
}

impl<T: InputDriver + ?Sized> InputDriver for &mut T {
    fn poll(&mut self, timeout: Duration) -> io::Result<bool> {
        (**self).poll(timeout)
    }

    fn read(&mut self) -> io::Result<Event> {
        (**self).read()
    }

    fn set_mouse_capture(&mut self, enabled: bool) -> io::Result<()> {
        (**self).set_mouse_capture(enabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
    use std::collections::VecDeque;

    struct Scripted(VecDeque<Event>);

    impl InputDriver for Scripted {
        fn poll(&mut self, _timeout: Duration) -> io::Result<bool> {
            Ok(!self.0.is_empty())
        }

        fn read(&mut self) -> io::Result<Event> {
            self.0
                .pop_front()
                .ok_or_else(|| io::Error::other("script exhausted"))
        }
    }

    fn first_event<D: InputDriver>(mut driver: D) -> io::Result<Option<Event>> {
        if driver.poll(Duration::from_millis(0))? {
            Ok(Some(driver.read()?))
        } else {
            Ok(None)
        }
    }

    #[test]
    fn blanket_impl_for_mut_ref_works() {
        let mut d = Scripted(VecDeque::from([Event::Key(KeyEvent::new(
            KeyCode::Char('x'),
            KeyModifiers::NONE,
        ))]));
        let first = first_event(&mut d).unwrap();
        assert!(matches!(first, Some(Event::Key(k)) if k.code == KeyCode::Char('x')));
        assert!(first_event(&mut d).unwrap().is_none());
        assert!(d.set_mouse_capture(true).is_ok());
    }
}
