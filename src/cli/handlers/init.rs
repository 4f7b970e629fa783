use std::fs;

use crate::cli::commands::InitArgs;
use crate::cli::handlers::Context;
use crate::io::config_io;
use crate::io::kv_store::FileStore;

const CONFIG_TOML_TEMPLATE: &str = r##"# focusspace configuration
# Every key is optional; the values below are the defaults.

[pomodoro]
work_minutes = 25
short_break_minutes = 5
long_break_minutes = 15

[goal]
# Daily completion target until one is set with `focus goal <n>`
default = 5

[backup]
# Write backups/focusspace_backup_<date>.json when the last one is older
# than interval_days
auto_backup = true
interval_days = 7

[ui]
# One line per task, no notes row
compact = false

[log]
# flexi_logger spec, e.g. "debug" or "focusspace=debug"
# FOCUSSPACE_LOG overrides this
level = "info"
"##;

pub fn cmd_init(ctx: &Context, args: InitArgs) -> Result<(), Box<dyn std::error::Error>> {
    FileStore::open(&ctx.data_dir)?;
    let wrote = if args.force {
        let path = config_io::config_path(&ctx.data_dir);
        fs::write(&path, CONFIG_TOML_TEMPLATE)
            .map_err(|e| format!("could not write {}: {}", path.display(), e))?;
        true
    } else {
        config_io::write_config_if_missing(&ctx.data_dir, CONFIG_TOML_TEMPLATE)?
    };

    if wrote {
        println!("initialized {}", ctx.data_dir.display());
    } else {
        println!(
            "{} already exists (use --force to overwrite)",
            config_io::config_path(&ctx.data_dir).display()
        );
    }
    Ok(())
}
