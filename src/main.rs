use std::process::ExitCode;

fn main() -> anyhow::Result<ExitCode> {
    let code = shoplist::run()?;
    Ok(code)
}
