use std::path::PathBuf;

use crate::db::{get_connection, init_db};
use crate::error::Result;
use crate::settings::{load_settings, save_settings, shellexpand_path};

pub fn run(data_dir: Option<String>) -> Result<()> {
    let mut settings = load_settings();
    if let Some(dir) = data_dir {
        settings.data_dir = shellexpand_path(&dir);
    }

    let dir = PathBuf::from(&settings.data_dir);
    std::fs::create_dir_all(&dir)?;

    let conn = get_connection(&dir.join("payplan.db"))?;
    init_db(&conn)?;
    save_settings(&settings)?;

    println!("Initialized payplan data in {}", dir.display());
    println!();
    println!("Next steps:");
    println!("  payplan budget set --monthly-income 4000 --bills-pct 50 --spending-pct 30 --savings-pct 20");
    println!("  payplan income add \"My Job\" --amount 2000 --frequency biweekly --next-payday 2026-08-21");
    println!("  payplan bill add Rent --amount 1400 --due 2026-09-01 --category housing");
    println!("  payplan plan");
    Ok(())
}
