use anyhow::Result;

use crate::app::App;
use crate::render::{Render, render_now};

pub fn run(app: &mut App, offset: i64) -> Result<()> {
    app.navigator.shift(offset);

    println!("{}", app.agenda().render());
    println!();
    println!("{}", render_now(&app.now()));
    Ok(())
}
