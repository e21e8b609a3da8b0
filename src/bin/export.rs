use std::path::PathBuf;

use postpage::{config::Config, export, state::AppState};

fn print_usage_and_exit() -> ! {
    eprintln!("Usage: export <out-dir>");
    std::process::exit(1);
}

#[tokio::main]
async fn main() {
    let mut args = std::env::args().skip(1); // 跳过程序名

    let out_dir = args.next().map(PathBuf::from).unwrap_or_else(|| {
        eprintln!("Missing <out-dir>");
        print_usage_and_exit();
    });

    if args.next().is_some() {
        eprintln!("Too many arguments provided.");
        print_usage_and_exit();
    }

    postpage::init_tracing();

    let result: postpage::error::Result<usize> = async {
        let config = Config::from_env()?;
        let state = AppState::new(&config)?;
        export::export_site(state.generator(), state.images(), &out_dir).await
    }
    .await;

    match result {
        Ok(pages) => println!("✅ Exported {} pages to {}", pages, out_dir.display()),
        Err(e) => {
            eprintln!("❌ Export failed: {e}");
            std::process::exit(1);
        }
    }
}
