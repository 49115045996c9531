//! `nutri hello` command - Greeting

use miette::Result;

#[derive(clap::Args, Debug)]
pub struct HelloArgs {
    /// Name to greet
    pub name: String,

    /// Display an extra message
    #[arg(long)]
    pub msg: bool,
}

pub fn run(args: HelloArgs) -> Result<()> {
    println!("{}", greeting(&args.name, args.msg));
    Ok(())
}

fn greeting(name: &str, msg: bool) -> String {
    if msg {
        format!("Hello {}! Finally! A working nutri command.", name)
    } else {
        format!("Hello {}!", name)
    }
}
