use argh::FromArgs;

mod encode;
mod eval;

#[derive(FromArgs, Debug)]
/// Evaluate monocular inverse depth predictions against metric ground truth.
struct Args {
    #[argh(subcommand)]
    command: Command,
}

#[derive(FromArgs, Debug)]
#[argh(subcommand)]
enum Command {
    Eval(eval::EvalArgs),
    Encode(encode::EncodeArgs),
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Args = argh::from_env();

    match args.command {
        Command::Eval(args) => eval::run(args),
        Command::Encode(args) => encode::run(args),
    }
}
