//! Music Store CLI
//!
//! Command-line interface for the Music Store API.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use musicstore_client::MusicStoreClient;
use musicstore_types::{AlbumId, CartItemId, CustomerDetails, GenreId, OrderId};

#[derive(Parser)]
#[command(name = "musicstore")]
#[command(author, version, about = "Music Store API CLI client", long_about = None)]
struct Cli {
    /// Base URL of the Music Store API
    #[arg(
        long,
        env = "MUSICSTORE_API_URL",
        default_value = "http://localhost:3000"
    )]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all genres
    Genres,
    /// List albums
    Albums {
        /// Only albums of this genre ID
        #[arg(long)]
        genre: Option<i64>,
    },
    /// Show one album
    Album {
        /// Album ID
        id: i64,
    },
    /// Shopping cart operations
    Cart {
        #[command(subcommand)]
        action: CartCommands,
    },
    /// Pay for a cart and create an order
    Checkout(CheckoutArgs),
    /// Show an order with its details
    Order {
        /// Order ID
        id: i64,
    },
    /// Check API health
    Health,
}

#[derive(Subcommand)]
enum CartCommands {
    /// Show a cart with its total
    Show {
        /// Cart identifier
        cart: String,
    },
    /// Add one copy of an album
    Add {
        /// Cart identifier
        cart: String,
        /// Album ID
        #[arg(long)]
        album: i64,
    },
    /// Take one copy out of a cart item
    Remove {
        /// Cart item ID
        item: i64,
    },
    /// Remove every item from a cart
    Empty {
        /// Cart identifier
        cart: String,
    },
}

#[derive(Args)]
struct CheckoutArgs {
    /// Cart identifier
    cart: String,
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    address: Option<String>,
    #[arg(long)]
    city: Option<String>,
    #[arg(long)]
    state: Option<String>,
    #[arg(long)]
    postal_code: Option<String>,
    #[arg(long)]
    country: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    /// Tokenized payment source
    #[arg(long, default_value = "tok_visa")]
    token: String,
}

impl CheckoutArgs {
    fn customer(&self) -> CustomerDetails {
        CustomerDetails {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            address: self.address.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            postal_code: self.postal_code.clone(),
            country: self.country.clone(),
            phone: self.phone.clone(),
            email: self.email.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let client = MusicStoreClient::new(&cli.api_url);

    match cli.command {
        Commands::Health => {
            let healthy = client.health().await?;
            if healthy {
                println!("✓ API is healthy");
            } else {
                println!("✗ API is not healthy");
                std::process::exit(1);
            }
        }

        Commands::Genres => {
            let genres = client.list_genres().await?;
            println!("{}", serde_json::to_string_pretty(&genres)?);
        }
        Commands::Albums { genre } => {
            let albums = client.list_albums(genre.map(GenreId::from_i64)).await?;
            println!("{}", serde_json::to_string_pretty(&albums)?);
        }
        Commands::Album { id } => {
            let album = client.get_album(AlbumId::from_i64(id)).await?;
            println!("{}", serde_json::to_string_pretty(&album)?);
        }

        Commands::Cart { action } => match action {
            CartCommands::Show { cart } => {
                let view = client.get_cart(&cart).await?;
                println!("{}", serde_json::to_string_pretty(&view)?);
            }
            CartCommands::Add { cart, album } => {
                client.add_to_cart(&cart, AlbumId::from_i64(album)).await?;
                println!("✓ Album {} added to cart {}", album, cart);
            }
            CartCommands::Remove { item } => {
                let left = client.remove_cart_item(CartItemId::from_i64(item)).await?;
                if left == 0 {
                    println!("✓ Cart item {} removed", item);
                } else {
                    println!("✓ Cart item {} now has {} copies", item, left);
                }
            }
            CartCommands::Empty { cart } => {
                client.empty_cart(&cart).await?;
                println!("✓ Cart {} emptied", cart);
            }
        },

        Commands::Checkout(args) => {
            let order_id = client
                .checkout(&args.cart, args.customer(), &args.token)
                .await?;
            println!("✓ Order {} created", order_id);
        }

        Commands::Order { id } => {
            let order = client.get_order(OrderId::from_i64(id)).await?;
            println!("{}", serde_json::to_string_pretty(&order)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_cart_add() {
        let cli = Cli::try_parse_from(["musicstore", "cart", "add", "session-1", "--album", "7"])
            .unwrap();

        match cli.command {
            Commands::Cart {
                action: CartCommands::Add { cart, album },
            } => {
                assert_eq!(cart, "session-1");
                assert_eq!(album, 7);
            }
            _ => panic!("expected cart add"),
        }
    }

    #[test]
    fn test_parse_checkout_defaults_token() {
        let cli = Cli::try_parse_from([
            "musicstore",
            "checkout",
            "session-1",
            "--first-name",
            "Jane",
            "--last-name",
            "Citizen",
            "--email",
            "jane@example.com",
            "--city",
            "Sydney",
        ])
        .unwrap();

        let Commands::Checkout(args) = cli.command else {
            panic!("expected checkout");
        };
        assert_eq!(args.token, "tok_visa");
        let customer = args.customer();
        assert_eq!(customer.city.as_deref(), Some("Sydney"));
        assert!(customer.address.is_none());
    }

    #[test]
    fn test_checkout_requires_email() {
        let result = Cli::try_parse_from([
            "musicstore",
            "checkout",
            "session-1",
            "--first-name",
            "Jane",
            "--last-name",
            "Citizen",
        ]);
        assert!(result.is_err());
    }
}
