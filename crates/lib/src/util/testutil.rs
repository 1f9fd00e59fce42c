//! Test helpers for kiln-lib.

use std::cell::RefCell;
use std::rc::Rc;

use crate::inputs::Input;
use crate::plugin::Plugin;

/// How often each build hook fired.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Counts {
  pub before_build: usize,
  pub after_build: usize,
  pub before_logic: usize,
  pub after_logic: usize,
}

/// A plugin that counts its build hook invocations.
pub fn counter_plugin() -> (Plugin, Rc<RefCell<Counts>>) {
  let counts = Rc::new(RefCell::new(Counts::default()));
  let (bb, ab, bl, al) = (counts.clone(), counts.clone(), counts.clone(), counts.clone());

  let plugin = Plugin::new("counter")
    .on_before_build(move |_, _, _| {
      bb.borrow_mut().before_build += 1;
      Ok(())
    })
    .on_after_build(move |_, _, _| {
      ab.borrow_mut().after_build += 1;
      Ok(())
    })
    .on_before_logic(move |_, _, _| {
      bl.borrow_mut().before_logic += 1;
      Ok(())
    })
    .on_after_logic(move |_, _, _| {
      al.borrow_mut().after_logic += 1;
      Ok(())
    });

  (plugin, counts)
}

/// An unnamed input with a static path.
pub fn input<I, S>(segments: I) -> Rc<Input>
where
  I: IntoIterator<Item = S>,
  S: Into<String>,
{
  Rc::new(Input::new().with_path(segments))
}
