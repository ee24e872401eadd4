//! Command definitions and handlers for the `sellhub` binary.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use sellhub_client::shared::currency::format_cents;
use sellhub_client::shared::{
    ApiError, CreateSellerRequest, Product, ProductQuery, ProductStatus, Seller, UpdateSellerRequest,
};
use sellhub_client::{
    login, logout, platform_store, ApiClient, ClientConfig, ImageUpload, SessionManager,
};

#[derive(Parser, Debug)]
#[command(name = "sellhub", version, about = "Manage your marketplace listings")]
struct Cli {
    /// Backend base URL
    #[arg(long, global = true, env = "SELLHUB_API_URL")]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and remember the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "SELLHUB_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Sign out here and on the backend
    Logout,
    /// Show whether a session is stored
    Status,
    /// Create a seller account
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "SELLHUB_PASSWORD", hide_env_values = true)]
        password: String,
        /// Attachment id returned by `upload`
        #[arg(long)]
        avatar_id: Option<String>,
    },
    /// Show the signed-in seller
    Profile,
    /// Update the signed-in seller
    UpdateProfile {
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        avatar_id: Option<String>,
        /// Current password, required to change it
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        new_password: Option<String>,
    },
    /// List your products
    Products {
        /// available, sold or cancelled
        #[arg(long)]
        status: Option<ProductStatus>,
        #[arg(long)]
        search: Option<String>,
    },
    /// Show one product and its views over the last 7 days
    Product { id: String },
    /// List product categories
    Categories,
    /// Upload images and print their attachment ids
    Upload {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
}

pub async fn run() -> ExitCode {
    let cli = Cli::parse();
    match execute(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn execute(cli: Cli) -> anyhow::Result<()> {
    let mut config = ClientConfig::from_env();
    if let Some(url) = cli.api_url {
        config = config.with_base_url(url);
    }

    let session = SessionManager::restore(platform_store(&config.session_key)).await;
    let api = ApiClient::new(&config)
        .context("failed to set up the HTTP client")?
        .with_unauthorized_hook(session.unauthorized_hook());

    let result = handle(cli.command, &api, &session).await;

    // Session changes are persisted in the background; make sure the last
    // one lands before the process exits.
    session.persist().await;
    result
}

async fn handle(command: Command, api: &ApiClient, session: &SessionManager) -> anyhow::Result<()> {
    match command {
        Command::Login { email, password } => {
            login(api, session, &email, &password)
                .await
                .map_err(|e| fail(e, "Não foi possível entrar."))?;
            println!("Signed in as {email}");
        }
        Command::Logout => {
            logout(api, session).await;
            println!("Signed out");
        }
        Command::Status => match session.session() {
            Some(_) => println!("Signed in"),
            None => println!("Not signed in"),
        },
        Command::Register {
            name,
            phone,
            email,
            password,
            avatar_id,
        } => {
            let body = CreateSellerRequest {
                name,
                phone,
                email,
                avatar_id,
                password_confirmation: password.clone(),
                password,
            };
            let seller = api
                .create_seller(&body, &session.access_token_or_empty())
                .await
                .map_err(|e| fail(e, "Não foi possível criar a conta."))?;
            print_seller(&seller);
        }
        Command::Profile => {
            let seller = api
                .get_seller_profile(&session.access_token_or_empty())
                .await
                .map_err(|e| fail(e, "Não foi possível carregar o perfil."))?;
            print_seller(&seller);
        }
        Command::UpdateProfile {
            name,
            phone,
            email,
            avatar_id,
            password,
            new_password,
        } => {
            let body = UpdateSellerRequest {
                name,
                phone,
                email,
                avatar_id,
                password,
                new_password,
            };
            let seller = api
                .update_seller(&body, &session.access_token_or_empty())
                .await
                .map_err(|e| fail(e, "Não foi possível atualizar o perfil."))?;
            print_seller(&seller);
        }
        Command::Products { status, search } => {
            let query = ProductQuery { status, search };
            let products = api
                .list_seller_products(&query, &session.access_token_or_empty())
                .await
                .map_err(|e| fail(e, "Não foi possível carregar os produtos."))?;
            if products.is_empty() {
                println!("No products");
            }
            for product in &products {
                print_product_line(product);
            }
        }
        Command::Product { id } => {
            let token = session.access_token_or_empty();
            let product = api
                .get_product_by_id(&id, &token)
                .await
                .map_err(|e| fail(e, "Não foi possível carregar o produto."))?;
            print_product_line(&product);
            println!("  {}", product.description);
            println!("  category: {}", product.category.title);
            if let Some(attachment) = product.attachments.first() {
                println!("  image: {}", api.resolve_asset_url(&attachment.url));
            }
            match api.product_views_last_7_days(&id, &token).await {
                Ok(amount) => println!("  views (7 days): {amount}"),
                Err(e) => eprintln!("  views unavailable: {}", e.user_message_or("erro desconhecido")),
            }
        }
        Command::Categories => {
            let categories = api
                .list_categories(&session.access_token_or_empty())
                .await
                .map_err(|e| fail(e, "Não foi possível carregar as categorias."))?;
            for category in categories {
                println!("{}  {} ({})", category.id, category.title, category.slug);
            }
        }
        Command::Upload { paths } => {
            let mut images = Vec::with_capacity(paths.len());
            for path in &paths {
                images.push(
                    ImageUpload::from_path(path)
                        .await
                        .map_err(|e| fail(e, "Não foi possível ler a imagem."))?,
                );
            }
            let attachments = api
                .upload_images(images, &session.access_token_or_empty())
                .await
                .map_err(|e| fail(e, "Não foi possível enviar as imagens."))?;
            for attachment in attachments {
                println!("{}  {}", attachment.id, api.resolve_asset_url(&attachment.url));
            }
        }
    }
    Ok(())
}

/// User-facing error: the error's own message when it is an expected one,
/// `fallback` otherwise.
fn fail(e: ApiError, fallback: &str) -> anyhow::Error {
    sellhub_client::log_debug!("command failed: {e:?}");
    if e.status() == Some(401) {
        return anyhow!("Sessão expirada. Faça login novamente.");
    }
    anyhow!(e.user_message_or(fallback))
}

fn print_seller(seller: &Seller) {
    println!("{} <{}>", seller.name, seller.email);
    println!("  id: {}", seller.id);
    println!("  phone: {}", seller.phone);
    if let Some(avatar) = &seller.avatar {
        println!("  avatar: {}", avatar.url);
    }
}

fn print_product_line(product: &Product) {
    println!(
        "{}  {}  R$ {}  [{}]",
        product.id,
        product.title,
        format_cents(product.price_in_cents),
        product.status
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_product_filters() {
        let cli = Cli::try_parse_from(["sellhub", "products", "--status", "sold", "--search", "mesa"])
            .unwrap();
        match cli.command {
            Command::Products { status, search } => {
                assert_eq!(status, Some(ProductStatus::Sold));
                assert_eq!(search.as_deref(), Some("mesa"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn unauthorized_errors_ask_for_a_new_login() {
        let err = fail(
            ApiError::Http {
                status: 401,
                message: None,
            },
            "fallback",
        );
        assert_eq!(err.to_string(), "Sessão expirada. Faça login novamente.");
    }
}
