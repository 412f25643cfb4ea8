//! 面向用户的固定文案

/// 首次请求位置的按钮
pub const SHARE_LOCATION_BUTTON: &str = "📍 Отправить геолокацию";

/// 再次请求位置的按钮
pub const SHARE_NEW_LOCATION_BUTTON: &str = "📍 Отправить новую геолокацию";

pub const HELP: &str = "🆘 *Помощь*\n\n\
📍 Этот бот помогает узнать интересные факты о местах рядом с вами.\n\n\
*Как пользоваться:*\n\
1. Отправьте команду /start\n\
2. Нажмите кнопку 'Отправить геолокацию'\n\
3. Получите интересный факт о ближайшем месте!\n\n\
*Доступные команды:*\n\
/start - начать работу с ботом\n\
/help - показать эту справку";

pub const SEARCHING: &str = "🔍 Ищу интересные места рядом с вами...";

pub const ASK_FOR_ANOTHER: &str = "Хотите узнать о другом месте? Отправьте новую геолокацию! 🗺️";

pub const APOLOGY: &str = "😔 Извините, не удалось получить информацию о местах рядом с вами. \
Попробуйте еще раз позже.";

pub const ONLY_LOCATION: &str = "🤔 Я понимаю только геолокацию!\n\n\
📍 Нажмите кнопку ниже, чтобы отправить свою геолокацию, \
и я расскажу интересный факт о ближайшем месте.";

/// 欢迎语
pub fn welcome(first_name: &str) -> String {
    format!(
        "Привет, {}! 👋\n\n\
         🌍 Я помогу вам узнать интересные факты о местах рядом с вами!\n\n\
         📍 Нажмите кнопку ниже, чтобы отправить свою геолокацию, \
         и я расскажу что-то необычное о ближайшем интересном месте.",
        first_name
    )
}

/// 趣闻回复
pub fn fact_reply(fact: &str) -> String {
    format!("✨ {}", fact)
}
