//! Command line client for the `ToDoIt` service.

use clap::{Parser, Subcommand, ValueEnum};
use todoit_core::proto::{
    CreateToDoRequest, DeleteToDoRequest, ListToDoRequest, ReadToDoRequest, ReadToDoResponse,
    ToDoStatus, UpdateToDoRequest, to_do_it_client::ToDoItClient,
};
use tonic::{codec::CompressionEncoding, transport::Channel};

#[derive(Parser, Debug)]
#[command(name = "todoit-client", version, about = "Talk to a todoit-server")]
struct Cli {
    /// Server endpoint.
    ///
    /// Environment variable: `TODOIT_ENDPOINT`
    #[arg(
        long,
        env = "TODOIT_ENDPOINT",
        default_value_t = String::from("http://127.0.0.1:50051")
    )]
    endpoint: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an item and print its id.
    Create { title: String, description: String },
    /// Print a single item.
    Read { id: i64 },
    /// Print every item.
    List,
    /// Overwrite an item's title, description and status.
    Update {
        id: i64,
        title: String,
        description: String,
        #[arg(long, value_enum, default_value_t = StatusArg::NotStarted)]
        status: StatusArg,
    },
    /// Delete an item.
    Delete { id: i64 },
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum StatusArg {
    NotStarted,
    InProgress,
    Done,
}

impl From<StatusArg> for ToDoStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::NotStarted => ToDoStatus::NotStarted,
            StatusArg::InProgress => ToDoStatus::InProgress,
            StatusArg::Done => ToDoStatus::Done,
        }
    }
}

fn print_item(item: &ReadToDoResponse) {
    println!(
        "{:>6} | {:<12} | {} | {}",
        item.id,
        item.status().as_str_name(),
        item.title,
        item.description
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let channel = Channel::from_shared(cli.endpoint)?.connect().await?;
    let mut client = ToDoItClient::new(channel)
        .send_compressed(CompressionEncoding::Zstd)
        .accept_compressed(CompressionEncoding::Zstd);

    match cli.command {
        Command::Create { title, description } => {
            let resp = client
                .create_to_do(CreateToDoRequest { title, description })
                .await?
                .into_inner();
            println!("created {}", resp.id);
        }
        Command::Read { id } => {
            let item = client
                .read_to_do(ReadToDoRequest { id })
                .await?
                .into_inner();
            print_item(&item);
        }
        Command::List => {
            let items = client
                .list_to_do(ListToDoRequest {})
                .await?
                .into_inner()
                .items;
            if items.is_empty() {
                println!("no items");
            }
            for item in &items {
                print_item(item);
            }
        }
        Command::Update {
            id,
            title,
            description,
            status,
        } => {
            let resp = client
                .update_to_do(UpdateToDoRequest {
                    id,
                    title,
                    description,
                    status: ToDoStatus::from(status).into(),
                })
                .await?
                .into_inner();
            println!("updated {}", resp.id);
        }
        Command::Delete { id } => {
            let resp = client
                .delete_to_do(DeleteToDoRequest { id })
                .await?
                .into_inner();
            println!("deleted {}", resp.id);
        }
    }

    Ok(())
}
