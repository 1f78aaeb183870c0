use argh::FromArgs;
use mongodb::bson::{Bson, Document};

use crate::command;
use crate::document_store::{DocumentStoreConfig, SchoolDirectory};

#[derive(FromArgs, PartialEq, Debug)]
#[argh(subcommand, name = "school", description = "Manage school documents")]
pub struct Options {
    #[argh(subcommand)]
    pub action: Action,
}

#[derive(FromArgs, PartialEq, Debug)]
#[argh(subcommand)]
pub enum Action {
    List(ListOptions),
    Insert(InsertOptions),
    Update(UpdateOptions),
    ByTopic(ByTopicOptions),
}

#[derive(FromArgs, PartialEq, Debug)]
#[argh(subcommand, name = "list", description = "List every school")]
pub struct ListOptions {}

#[derive(FromArgs, PartialEq, Debug)]
#[argh(subcommand, name = "insert", description = "Insert a school and print its id")]
pub struct InsertOptions {
    #[argh(option, short = 'n')]
    /// name of the school
    pub name: String,
    #[argh(option, short = 't')]
    /// topic taught by the school, may be repeated
    pub topic: Vec<String>,
    #[argh(option, short = 'f')]
    /// additional `key=value` field, may be repeated
    pub field: Vec<String>,
}

#[derive(FromArgs, PartialEq, Debug)]
#[argh(
    subcommand,
    name = "update",
    description = "Replace the topics of every school with the given name"
)]
pub struct UpdateOptions {
    #[argh(option, short = 'n')]
    /// name of the schools to update
    pub name: String,
    #[argh(option, short = 't')]
    /// new topic, may be repeated
    pub topic: Vec<String>,
}

#[derive(FromArgs, PartialEq, Debug)]
#[argh(subcommand, name = "by-topic", description = "List the schools teaching a topic")]
pub struct ByTopicOptions {
    #[argh(positional)]
    /// the topic to look for
    pub topic: String,
}

pub struct Command {
    schools: SchoolDirectory,
}

fn to_json(document: Document) -> String {
    Bson::Document(document).into_relaxed_extjson().to_string()
}

fn parse_fields(fields: &[String]) -> Result<Document, command::Error> {
    let mut document = Document::new();
    for field in fields {
        let Some((key, value)) = field.split_once('=') else {
            return Err(command::Error::InvalidArgument(format!(
                "Expected key=value, got {field}"
            )));
        };
        document.insert(key, value);
    }
    Ok(document)
}

impl Command {
    pub async fn new(config: &DocumentStoreConfig) -> Result<Self, command::Error> {
        let store = config.to_backend().await?;
        Ok(Self {
            schools: SchoolDirectory::new(store),
        })
    }

    /// Run `options` and return the lines to print
    pub async fn run(&self, options: &Options) -> Result<Vec<String>, command::Error> {
        match &options.action {
            Action::List(_) => Ok(self
                .schools
                .list_all()
                .await?
                .into_iter()
                .map(to_json)
                .collect()),
            Action::Insert(insert) => {
                let mut fields = Document::new();
                fields.insert("name", insert.name.as_str());
                fields.insert("topics", insert.topic.clone());
                for (key, value) in parse_fields(&insert.field)? {
                    fields.insert(key, value);
                }

                let id = self.schools.insert_school(fields).await?;
                Ok(vec![id.into_relaxed_extjson().to_string()])
            }
            Action::Update(update) => {
                let modified = self
                    .schools
                    .update_topics(&update.name, &update.topic)
                    .await?;
                Ok(vec![format!("{modified} schools updated")])
            }
            Action::ByTopic(by_topic) => Ok(self
                .schools
                .schools_by_topic(&by_topic.topic)
                .await?
                .into_iter()
                .map(to_json)
                .collect()),
        }
    }
}
