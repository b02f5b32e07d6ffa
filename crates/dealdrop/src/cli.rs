//! Clap derive structures for the `dealdrop` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.
//! Only depends on clap so `build.rs` can include it for man pages.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// dealdrop -- browse deals, manage your cart, and run the marketplace
#[derive(Debug, Parser)]
#[command(
    name = "dealdrop",
    version,
    about = "Deals and coupons marketplace from the command line",
    long_about = "Browse and filter deals, save and like them, check out a cart through\n\
        Paystack, onboard as a vendor, join group deals, and moderate the\n\
        marketplace as an administrator.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Configuration profile to use
    #[arg(long, short = 'p', env = "DEALDROP_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Backend API root (overrides profile)
    #[arg(long, env = "DEALDROP_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "DEALDROP_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept invalid TLS certificates (local development backends)
    #[arg(long, short = 'k', env = "DEALDROP_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "DEALDROP_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Browse, filter, and engage with deals
    #[command(alias = "d")]
    Deals(DealsArgs),

    /// Deals you have saved
    Saved(SavedArgs),

    /// Manage your shopping cart
    Cart(CartArgs),

    /// Pay for a cart, vendor plan, or group-deal slot
    #[command(alias = "co")]
    Checkout(CheckoutArgs),

    /// Vendor onboarding and plans
    Vendor(VendorArgs),

    /// Group deals with shared slots
    Group(GroupArgs),

    /// Deal discussion threads
    Comments(CommentsArgs),

    /// Administrator moderation actions
    #[command(alias = "mod")]
    Moderate(ModerateArgs),

    /// Request a magic sign-in link
    Login {
        /// Email address to send the link to
        email: String,
    },

    /// Complete sign-in with the token from the magic link
    Verify {
        /// Token from the emailed link
        token: String,
    },

    /// Sign out and forget the stored session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DEALS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DealsArgs {
    #[command(subcommand)]
    pub command: DealsCommand,
}

#[derive(Debug, Subcommand)]
pub enum DealsCommand {
    /// List deals with filters, sorting, and pagination
    #[command(alias = "ls")]
    List(DealsListArgs),

    /// Show deal details
    Get {
        /// Deal ID
        deal: String,
    },

    /// Save or unsave a deal
    Save {
        /// Deal ID
        deal: String,
    },

    /// Like or unlike a deal
    Like {
        /// Deal ID
        deal: String,
    },

    /// Vote a deal up or down
    Vote {
        /// Deal ID
        deal: String,

        /// Vote direction
        #[arg(value_enum)]
        direction: VoteArg,
    },

    /// List coupons, optionally for one deal
    Coupons {
        /// Deal ID
        #[arg(long)]
        deal: Option<String>,
    },
}

/// Filter toolbar inputs. Bounds are free text: blank or non-numeric
/// values are ignored.
#[derive(Debug, Args)]
pub struct DealsListArgs {
    /// Case-insensitive text search over title and description
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Category ("all" disables the filter)
    #[arg(long, short = 'c')]
    pub category: Option<String>,

    /// Sort key: newest, oldest, discount-high, discount-low, price-low,
    /// price-high, popularity
    #[arg(long, default_value = "newest")]
    pub sort: String,

    #[arg(long, allow_hyphen_values = true)]
    pub min_price: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    pub max_price: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    pub min_discount: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    pub max_discount: Option<String>,

    /// Only deals you have saved
    #[arg(long)]
    pub saved_only: bool,

    /// Hide deals past their expiry
    #[arg(long)]
    pub hide_expired: bool,

    /// Page number (1-based)
    #[arg(long, default_value = "1")]
    pub page: usize,

    /// Moderation status to load (admins: pending, rejected, ...)
    #[arg(long)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum VoteArg {
    Up,
    Down,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SAVED / CART
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct SavedArgs {
    #[command(subcommand)]
    pub command: SavedCommand,
}

#[derive(Debug, Subcommand)]
pub enum SavedCommand {
    /// List saved deals in the order they were saved
    #[command(alias = "ls")]
    List,
}

#[derive(Debug, Args)]
pub struct CartArgs {
    #[command(subcommand)]
    pub command: CartCommand,
}

#[derive(Debug, Subcommand)]
pub enum CartCommand {
    /// Show cart lines and total
    #[command(alias = "ls")]
    List,

    /// Add a deal to the cart
    Add {
        /// Deal ID
        deal: String,

        /// Quantity to add
        #[arg(long, short = 'n', default_value = "1")]
        quantity: u32,
    },

    /// Set a line's quantity (0 removes it)
    Set {
        /// Deal ID
        deal: String,

        /// New quantity
        quantity: u32,
    },

    /// Remove a deal from the cart
    #[command(alias = "rm")]
    Remove {
        /// Deal ID
        deal: String,
    },

    /// Empty the cart
    Clear,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CHECKOUT
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CheckoutArgs {
    #[command(subcommand)]
    pub command: CheckoutCommand,
}

#[derive(Debug, Subcommand)]
pub enum CheckoutCommand {
    /// Start paying for everything in the cart
    Start,

    /// Continue a checkout after paying (or after a failure)
    Resume {
        /// Checkout key (UUID)
        key: String,

        /// Keep checking until the payment settles
        #[arg(long)]
        wait: bool,
    },

    /// Show one checkout
    Status {
        /// Checkout key (UUID)
        key: String,
    },

    /// List recorded checkouts
    #[command(alias = "ls")]
    List,

    /// Forget finished checkouts (all of them, or one by key)
    Clear {
        /// Checkout key (UUID)
        key: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  VENDOR
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct VendorArgs {
    #[command(subcommand)]
    pub command: VendorCommand,
}

#[derive(Debug, Subcommand)]
pub enum VendorCommand {
    /// List subscription plans
    Plans,

    /// Show a vendor
    Get {
        /// Vendor ID
        vendor: String,
    },

    /// Edit the onboarding application
    Draft(DraftArgs),

    /// Stage a document on the application
    Upload {
        /// File to attach
        path: PathBuf,
    },

    /// Pay for a plan and submit the application
    Subscribe {
        /// Plan ID
        plan: String,
    },
}

#[derive(Debug, Args)]
pub struct DraftArgs {
    #[command(subcommand)]
    pub command: DraftCommand,
}

#[derive(Debug, Subcommand)]
pub enum DraftCommand {
    /// Show the application in progress
    Show,

    /// Set application fields
    Set {
        #[arg(long)]
        business_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },

    /// Move to the next onboarding step
    Next,

    /// Discard the application
    Clear,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  GROUP DEALS / COMMENTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct GroupArgs {
    #[command(subcommand)]
    pub command: GroupCommand,
}

#[derive(Debug, Subcommand)]
pub enum GroupCommand {
    /// Show slots for a group deal
    Show {
        /// Deal ID
        deal: String,
    },

    /// Pay for a slot in a group deal
    Join {
        /// Deal ID
        deal: String,
    },
}

#[derive(Debug, Args)]
pub struct CommentsArgs {
    #[command(subcommand)]
    pub command: CommentsCommand,
}

#[derive(Debug, Subcommand)]
pub enum CommentsCommand {
    /// Show a deal's discussion as a thread
    Show {
        /// Deal ID
        deal: String,
    },

    /// Post a comment or a reply
    Post {
        /// Deal ID
        deal: String,

        /// Comment text
        body: String,

        /// Comment ID to reply to
        #[arg(long)]
        reply_to: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  MODERATION
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ModerateArgs {
    #[command(subcommand)]
    pub command: ModerateCommand,
}

#[derive(Debug, Subcommand)]
pub enum ModerateCommand {
    /// Approve a pending deal
    Approve {
        /// Deal ID
        deal: String,
    },

    /// Reject a deal
    Reject {
        /// Deal ID
        deal: String,

        /// Reason sent to the vendor
        #[arg(long)]
        reason: Option<String>,
    },

    /// Suspend a vendor
    Suspend {
        /// Vendor ID
        vendor: String,

        /// Reason sent to the vendor
        #[arg(long)]
        reason: Option<String>,
    },

    /// Reinstate a suspended vendor
    Reinstate {
        /// Vendor ID
        vendor: String,
    },

    /// Delete a comment
    DeleteComment {
        /// Comment ID
        comment: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current configuration (secrets masked)
    Show,

    /// Set a value on the active profile
    Set {
        /// Profile key, e.g. "api_url", "currency", "email_from"
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store a provider secret for the active profile in the system keyring
    SetSecret {
        /// Which secret: paystack-secret or resend-api-key
        kind: String,
    },
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
