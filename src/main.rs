use actix::Actor;
use actix_cors::Cors;
use actix_web::{
    self, App, HttpServer,
    middleware::{Logger, from_fn},
    web,
};
use std::sync::{Arc, LazyLock};

use crate::{
    configs::{RedisCache, connect_database, run_migrations},
    middlewares::{authentication, authorization},
    modules::{
        chat::{repository_pg::ChatRepositoryPg, service::ChatService},
        comment::{repository_pg::CommentRepositoryPg, service::CommentService},
        fcm::{
            repository_pg::FcmTokenRepositoryPg,
            service::{FcmClient, FcmService, PushNotifier},
        },
        file_upload::{repository_pg::FileRepositoryPg, service::FileUploadService},
        friend::{repository_pg::FriendRepositoryPg, service::FriendService},
        link_preview::service::LinkPreviewService,
        message::{repository_pg::MessageRepositoryPg, service::MessageService},
        post::{repository_pg::PostRepositoryPg, service::PostService},
        reaction::{repository_pg::ReactionRepositoryPg, service::ReactionService},
        user::{
            mailer::SmtpMailer, repository_pg::UserRepositoryPg, schema::UserRole,
            service::UserService,
        },
        websocket::{handler::websocket_handler, server::WebSocketServer},
    },
};

mod api;
mod configs;
mod constants;
mod middlewares;
mod modules;
mod utils;

pub static ENV: LazyLock<constants::Env> = LazyLock::new(|| {
    dotenvy::dotenv().ok();
    env_logger::init();
    log::info!("Environment variables loaded from .env file");
    constants::Env::default()
});

#[actix_web::get("/")]
async fn health_check() -> &'static str {
    "Server is running"
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let db_pool =
        connect_database().await.map_err(|_| std::io::Error::other("Database connection error"))?;
    run_migrations(&db_pool)
        .await
        .map_err(|_| std::io::Error::other("Database migration error"))?;

    let redis_cache = Arc::new(
        RedisCache::new().await.map_err(|_| std::io::Error::other("Redis connection error"))?,
    );

    let user_repo = Arc::new(UserRepositoryPg::new(db_pool.clone()));
    let friend_repo = Arc::new(FriendRepositoryPg::new(db_pool.clone()));
    let file_repo = Arc::new(FileRepositoryPg::new(db_pool.clone()));
    let post_repo = Arc::new(PostRepositoryPg::new(db_pool.clone()));
    let comment_repo = Arc::new(CommentRepositoryPg::new(db_pool.clone()));
    let chat_repo = Arc::new(ChatRepositoryPg::new(db_pool.clone()));
    let message_repo = Arc::new(MessageRepositoryPg::new(db_pool.clone()));
    let reaction_repo = Arc::new(ReactionRepositoryPg::new(db_pool.clone()));
    let fcm_token_repo = Arc::new(FcmTokenRepositoryPg::new(db_pool.clone()));

    let mailer = Arc::new(
        SmtpMailer::from_env().map_err(|_| std::io::Error::other("SMTP configuration error"))?,
    );

    let file_service = FileUploadService::with_defaults(file_repo.clone());
    let reaction_service = ReactionService::with_dependencies(reaction_repo.clone());
    let chat_service = ChatService::with_dependencies(chat_repo.clone());

    let fcm_service =
        FcmService::with_dependencies(fcm_token_repo.clone(), FcmClient::from_env());
    let notifier: Arc<dyn PushNotifier + Send + Sync> = Arc::new(fcm_service.clone());

    let user_service = UserService::with_dependencies(
        user_repo.clone(),
        redis_cache.clone(),
        mailer.clone(),
    );
    let friend_service = FriendService::with_dependencies(
        friend_repo.clone(),
        user_repo.clone(),
        chat_service.clone(),
        notifier,
    );
    let post_service = PostService::with_dependencies(
        post_repo.clone(),
        reaction_repo.clone(),
        reaction_service.clone(),
        file_service.clone(),
        user_repo.clone(),
    );
    let comment_service = CommentService::with_dependencies(
        comment_repo.clone(),
        reaction_repo.clone(),
        reaction_service.clone(),
        file_service.clone(),
        post_repo.clone(),
        user_repo.clone(),
    );
    let link_preview_service = LinkPreviewService::new(redis_cache.clone())
        .map_err(|_| std::io::Error::other("HTTP client configuration error"))?;

    let ws_server = WebSocketServer::new().start();
    let message_service = MessageService::with_dependencies(
        message_repo.clone(),
        chat_service.clone(),
        reaction_repo.clone(),
        reaction_service.clone(),
        file_service.clone(),
        Arc::new(ws_server.clone()),
    );

    println!("Starting server at http://{}:{}", ENV.ip.as_str(), ENV.port);
    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(ENV.frontend_url.as_str())
            .allow_any_method()
            .allow_any_header()
            .supports_credentials();

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(web::Data::new(user_service.clone()))
            .app_data(web::Data::new(friend_service.clone()))
            .app_data(web::Data::new(file_service.clone()))
            .app_data(web::Data::new(post_service.clone()))
            .app_data(web::Data::new(comment_service.clone()))
            .app_data(web::Data::new(chat_service.clone()))
            .app_data(web::Data::new(message_service.clone()))
            .app_data(web::Data::new(reaction_service.clone()))
            .app_data(web::Data::new(fcm_service.clone()))
            .app_data(web::Data::new(link_preview_service.clone()))
            .app_data(web::Data::new(ws_server.clone()))
            .app_data(web::Data::new(db_pool.clone()))
            .service(health_check)
            .route("/ws", web::get().to(websocket_handler))
            .service(
                web::scope("/api").configure(modules::user::route::public_api_configure).service(
                    web::scope("")
                        .wrap(from_fn(authorization(vec![UserRole::User, UserRole::Admin])))
                        .wrap(from_fn(authentication))
                        .configure(modules::user::route::configure)
                        .configure(modules::friend::route::configure)
                        .configure(modules::file_upload::route::configure::<FileRepositoryPg>)
                        .configure(modules::post::route::configure)
                        .configure(modules::comment::route::configure)
                        .configure(modules::reaction::route::configure)
                        .configure(modules::chat::route::configure)
                        .configure(modules::message::route::configure)
                        .configure(modules::fcm::route::configure)
                        .configure(modules::link_preview::route::configure),
                ),
            )
    })
    .bind((ENV.ip.as_str(), ENV.port))?
    .workers(2)
    .run()
    .await
}
