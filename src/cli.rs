use clap::{Args, Parser, Subcommand};

use crate::app::feed::{FeedState, FeedView};
use crate::app::likes::{like_count_label, liked_by_line, GestureOutcome};
use crate::app::navigation::Route;
use crate::domain::post::{CategoryFilter, Post, PostDraft};
use crate::domain::user::Session;
use crate::domain::PostId;
use crate::error::{AppError, AppResult};
use crate::http::{ApiError, ErrorKind};
use crate::AppState;

#[derive(Parser, Debug)]
#[command(name = "quire", about = "Command-line client for the blog backend")]
pub struct Cli {
    /// Backend API base URL (overrides QUIRE_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create an account
    Signup {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Sign in and remember the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in identity
    Whoami,
    /// List posts
    Feed {
        #[arg(long, default_value = "All")]
        category: String,
        /// Show the three most liked posts instead
        #[arg(long)]
        popular: bool,
    },
    /// Post counts per category
    Categories,
    /// Open a page by path, e.g. /home, /profile or /post/12
    Open { path: String },
    /// Toggle your like on a post
    Like { post_id: PostId },
    /// Like a post the way a double-click does; never unlikes
    Heart { post_id: PostId },
    /// Show the comments on a post
    Comments { post_id: PostId },
    /// Comment on a post
    Comment { post_id: PostId, text: String },
    /// Write, edit or delete your posts
    #[command(subcommand)]
    Post(PostCommand),
}

#[derive(Subcommand, Debug)]
pub enum PostCommand {
    Create(DraftArgs),
    Edit {
        post_id: PostId,
        #[command(flatten)]
        draft: DraftArgs,
    },
    Delete { post_id: PostId },
}

#[derive(Args, Debug)]
pub struct DraftArgs {
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub excerpt: String,
    #[arg(long)]
    pub category: String,
    #[arg(long, default_value = "")]
    pub cover_image: String,
    #[arg(long)]
    pub content: String,
}

impl From<DraftArgs> for PostDraft {
    fn from(args: DraftArgs) -> Self {
        Self {
            title: args.title,
            excerpt: args.excerpt,
            category: args.category,
            cover_image: args.cover_image,
            content: args.content,
        }
    }
}

pub async fn run(command: Command, state: &AppState) -> AppResult<()> {
    match command {
        Command::Signup {
            username,
            email,
            password,
        } => {
            let message = state.sessions.register(&username, &email, &password).await?;
            println!("{}", message);
        }
        Command::Login { email, password } => {
            let session = state.sessions.login(&email, &password).await?;
            println!("Signed in as {} <{}>", session.username, session.email);
        }
        Command::Logout => {
            let next = state.sessions.logout().await?;
            println!("Signed out. Next: {}", next.path());
        }
        Command::Whoami => match state.sessions.current().await {
            Some(session) => println!("{} <{}> (id {})", session.username, session.email, session.user_id),
            None => println!("Not signed in"),
        },
        Command::Feed { category, popular } => {
            state.sessions.require().await?;
            let mut feed = FeedState::default();
            state.feed.load(&mut feed, CategoryFilter::parse(&category)).await?;
            if popular {
                feed.select_view(FeedView::Popular);
            }
            print_cards(&feed.visible());
        }
        Command::Categories => {
            state.sessions.require().await?;
            for (name, count) in state.feed.category_counts().await? {
                println!("{:<12} {}", name, count);
            }
        }
        Command::Open { path } => {
            let session = state.sessions.current().await;
            let route = Route::from_path(&path).resolve(session.as_ref());
            open(route, session, state).await?;
        }
        Command::Like { post_id } => {
            let session = state.sessions.require().await?;
            let post = state.feed.post(post_id).await?;
            let likes = state.likes_for(&post, &session);
            let snapshot = likes.toggle().await?;
            let verb = if snapshot.viewer_has_liked { "Liked" } else { "Unliked" };
            println!("{} \"{}\" ({})", verb, post.title, like_count_label(snapshot.count));
        }
        Command::Heart { post_id } => {
            let session = state.sessions.require().await?;
            let post = state.feed.post(post_id).await?;
            let likes = state.likes_for(&post, &session);
            match likes.like_by_gesture().await? {
                GestureOutcome::Liked => println!("Liked \"{}\"", post.title),
                _ => println!("Already liked \"{}\"", post.title),
            }
        }
        Command::Comments { post_id } => {
            state.sessions.require().await?;
            let panel = state.comments_for(post_id);
            print_comments(&panel.open().await?);
        }
        Command::Comment { post_id, text } => {
            let session = state.sessions.require().await?;
            let panel = state.comments_for(post_id);
            let comment = panel.submit(&session, &text).await?;
            println!("Comment #{} posted", comment.id);
        }
        Command::Post(PostCommand::Create(args)) => {
            let post = state.posts.create(&args.into()).await?;
            println!("Created post #{}", post.id);
        }
        Command::Post(PostCommand::Edit { post_id, draft }) => {
            let post = state.posts.update(post_id, &draft.into()).await?;
            println!("Updated post #{}", post.id);
        }
        Command::Post(PostCommand::Delete { post_id }) => {
            state.posts.delete(post_id).await?;
            println!("Deleted post #{}", post_id);
        }
    }
    Ok(())
}

async fn open(route: Route, session: Option<Session>, state: &AppState) -> AppResult<()> {
    let session = match (route, session) {
        (Route::Login, _) => {
            println!("Sign in with: quire login --email <email> --password <password>");
            return Ok(());
        }
        (Route::SignUp, _) => {
            println!("Register with: quire signup --username <name> --email <email> --password <password>");
            return Ok(());
        }
        (_, Some(session)) => session,
        (_, None) => return Err(AppError::NotSignedIn),
    };

    match route {
        Route::Home => {
            let mut feed = FeedState::default();
            state.feed.load(&mut feed, CategoryFilter::All).await?;
            print_cards(&feed.visible());
        }
        Route::CreatePost => {
            println!("Write a post with: quire post create --title .. --excerpt .. --category .. --content ..");
        }
        Route::Post(post_id) => print_detail(post_id, &session, state).await?,
        Route::Profile => {
            println!("{} <{}>", session.username, session.email);
            print_cards(&state.posts.mine().await?);
        }
        Route::Login | Route::SignUp => {}
    }
    Ok(())
}

async fn print_detail(post_id: PostId, session: &Session, state: &AppState) -> AppResult<()> {
    let post = state.feed.post(post_id).await?;
    let likes = state.likes_for(&post, session);
    let panel = state.comments_for(post.id);

    let (snapshot, comments) = tokio::join!(likes.refresh(), panel.open());
    let snapshot = match snapshot {
        Ok(snapshot) => snapshot,
        Err(err) => {
            tracing::warn!(error = %err, post_id, "showing likes from the feed listing");
            likes.snapshot().await
        }
    };

    println!("{}", post.title);
    println!(
        "by {} in {}{}",
        post.username,
        post.category,
        post.published_on().map(|date| format!(" on {}", date)).unwrap_or_default()
    );
    println!();
    println!("{}", post.content);
    println!();
    println!("{}", like_count_label(snapshot.count));
    match likes.liker_names().await {
        Ok(names) => {
            if let Some(line) = liked_by_line(&names, &session.username, snapshot.viewer_has_liked) {
                println!("{}", line);
            }
        }
        Err(err) => tracing::warn!(error = %err, post_id, "could not resolve liker names"),
    }
    println!();
    match comments {
        Ok(comments) => print_comments(&comments),
        Err(err) => println!("Could not load comments: {}", describe(&err)),
    }
    Ok(())
}

fn print_cards(posts: &[Post]) {
    if posts.is_empty() {
        println!("No posts yet");
        return;
    }
    for post in posts {
        println!(
            "#{:<4} [{}] {} by {} ({})",
            post.id,
            post.category,
            post.title,
            post.username,
            like_count_label(post.like_count())
        );
        if !post.excerpt.is_empty() {
            println!("      {}", post.excerpt);
        }
    }
}

fn print_comments(comments: &[crate::domain::engagement::Comment]) {
    if comments.is_empty() {
        println!("No comments yet");
        return;
    }
    for comment in comments {
        println!("{}: {}", comment.author_display(), comment.text);
    }
}

/// User-facing wording for a failure.
pub fn describe(err: &AppError) -> String {
    match err {
        AppError::NotSignedIn => "Log in to access (quire login)".to_string(),
        AppError::Api(api) => describe_api(api),
        other => other.to_string(),
    }
}

fn describe_api(err: &ApiError) -> String {
    match (err.kind(), err.message()) {
        (ErrorKind::Network, _) => "Could not reach the blog backend".to_string(),
        (ErrorKind::Unauthorized, _) => "Your session is no longer valid; log in again".to_string(),
        (ErrorKind::NotFound, _) => "Not found".to_string(),
        (_, Some(message)) => message.to_string(),
        _ => err.to_string(),
    }
}
