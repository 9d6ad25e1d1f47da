use clap::Parser;

#[derive(Parser)]
#[command(name = "best-kmod")]
#[command(version, about = "Serves the current kernel module package for a kernel/distribution")]
struct Cli {}

fn main() -> anyhow::Result<()> {
    let _cli = Cli::parse();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(best_kmod::service::server::run_server())
}
