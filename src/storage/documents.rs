use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account owned by the surrounding application. Only `avatar` is written here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub avatar: String,
    pub date: DateTime<Utc>,
}

impl User {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
            avatar: String::new(),
            date: Utc::now(),
        }
    }
}

/// The user fields attached to a populated profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub avatar: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            avatar: user.avatar.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub user: Uuid,
    pub text: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub avatar: String,
    pub date: DateTime<Utc>,
}

impl Post {
    pub fn new(user: Uuid, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user,
            text: text.into(),
            name: String::new(),
            avatar: String::new(),
            date: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Social {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub youtube: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    #[serde(default)]
    pub location: Option<String>,
    pub from: DateTime<Utc>,
    #[serde(default)]
    pub to: Option<DateTime<Utc>>,
    #[serde(default)]
    pub current: bool,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Education {
    pub id: Uuid,
    pub school: String,
    pub degree: String,
    pub fieldofstudy: String,
    pub from: DateTime<Utc>,
    #[serde(default)]
    pub to: Option<DateTime<Utc>>,
    #[serde(default)]
    pub current: bool,
    #[serde(default)]
    pub description: Option<String>,
}

/// Scalar profile fields replaced wholesale on every create/update
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileFields {
    pub company: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub skills: Vec<String>,
    pub status: String,
    pub githubusername: Option<String>,
    pub usegithubavatar: bool,
    pub social: Social,
}

/// Profile document. `U` is the owning user reference: a bare id when stored,
/// a [`UserSummary`] (or `None` for a dangling reference) once populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile<U = Uuid> {
    pub id: Uuid,
    pub user: U,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    pub status: String,
    #[serde(default)]
    pub githubusername: Option<String>,
    #[serde(default)]
    pub usegithubavatar: bool,
    #[serde(default)]
    pub social: Social,
    #[serde(default)]
    pub experience: Vec<Experience>,
    #[serde(default)]
    pub education: Vec<Education>,
    pub date: DateTime<Utc>,
}

impl Profile {
    pub fn new(user: Uuid, fields: ProfileFields) -> Self {
        let mut profile = Self {
            id: Uuid::new_v4(),
            user,
            company: None,
            website: None,
            location: None,
            bio: None,
            skills: Vec::new(),
            status: String::new(),
            githubusername: None,
            usegithubavatar: false,
            social: Social::default(),
            experience: Vec::new(),
            education: Vec::new(),
            date: Utc::now(),
        };
        profile.apply(fields);
        profile
    }

    /// Overwrite the scalar fields; id, sub-document lists and date are kept
    pub fn apply(&mut self, fields: ProfileFields) {
        self.company = fields.company;
        self.website = fields.website;
        self.location = fields.location;
        self.bio = fields.bio;
        self.skills = fields.skills;
        self.status = fields.status;
        self.githubusername = fields.githubusername;
        self.usegithubavatar = fields.usegithubavatar;
        self.social = fields.social;
    }

    /// Most recent entry goes first
    pub fn add_experience(&mut self, entry: Experience) {
        self.experience.insert(0, entry);
    }

    pub fn remove_experience(&mut self, id: &str) {
        self.experience.retain(|exp| exp.id.to_string() != id);
    }

    pub fn add_education(&mut self, entry: Education) {
        self.education.insert(0, entry);
    }

    pub fn remove_education(&mut self, id: &str) {
        self.education.retain(|edu| edu.id.to_string() != id);
    }

    /// Swap the user id for the owning user's details
    pub fn populate<U>(self, user: U) -> Profile<U> {
        Profile {
            id: self.id,
            user,
            company: self.company,
            website: self.website,
            location: self.location,
            bio: self.bio,
            skills: self.skills,
            status: self.status,
            githubusername: self.githubusername,
            usegithubavatar: self.usegithubavatar,
            social: self.social,
            experience: self.experience,
            education: self.education,
            date: self.date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn experience(title: &str) -> Experience {
        Experience {
            id: Uuid::new_v4(),
            title: title.to_string(),
            company: "Acme".to_string(),
            location: None,
            from: Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
            to: None,
            current: true,
            description: None,
        }
    }

    fn fields(status: &str) -> ProfileFields {
        ProfileFields {
            status: status.to_string(),
            skills: vec!["rust".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn newest_experience_is_first() {
        let mut profile = Profile::new(Uuid::new_v4(), fields("Developer"));
        profile.add_experience(experience("first"));
        profile.add_experience(experience("second"));

        let titles: Vec<_> = profile.experience.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, ["second", "first"]);
    }

    #[test]
    fn removes_only_the_matching_entry() {
        let mut profile = Profile::new(Uuid::new_v4(), fields("Developer"));
        let keep = experience("keep");
        let drop = experience("drop");
        let drop_id = drop.id.to_string();
        profile.add_experience(keep.clone());
        profile.add_experience(drop);

        profile.remove_experience(&drop_id);
        assert_eq!(profile.experience, vec![keep.clone()]);

        profile.remove_experience("not-an-id");
        assert_eq!(profile.experience, vec![keep]);
    }

    #[test]
    fn apply_keeps_identity_and_lists() {
        let mut profile = Profile::new(Uuid::new_v4(), fields("Junior"));
        profile.add_experience(experience("job"));
        let id = profile.id;

        profile.apply(fields("Senior"));

        assert_eq!(profile.id, id);
        assert_eq!(profile.status, "Senior");
        assert_eq!(profile.experience.len(), 1);
    }

    #[test]
    fn populated_profile_serializes_user_summary() {
        let user = User::new("Ada", "ada@example.com");
        let profile = Profile::new(user.id, fields("Developer")).populate(UserSummary::from(&user));

        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["user"]["name"], "Ada");
        assert_eq!(json["user"]["id"], user.id.to_string());
        assert!(json["social"].as_object().unwrap().is_empty());
    }
}
